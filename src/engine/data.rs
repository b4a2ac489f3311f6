use super::{Engine, Hooks};
use crate::dispatch::PatternMatch;
use crate::errors::Result;
use crate::flags::Flags;
use serde_json::Value;

impl Engine {
    /// Search every string inside nested data.
    ///
    /// Strings are searched; arrays are walked in order; objects are walked
    /// through their values in insertion order (keys are never searched).
    /// Numbers, booleans and nulls contribute nothing. Each string
    /// contributes at most its first match, and every match is dispatched.
    ///
    /// The pattern is compiled up front, so an invalid pattern fails even
    /// when `data` holds no strings.
    pub fn recursive_search(&mut self, pattern: &str, data: &Value) -> Result<Vec<PatternMatch>> {
        self.recursive_search_with(pattern, data, Flags::empty())
    }

    pub fn recursive_search_with(
        &mut self,
        pattern: &str,
        data: &Value,
        flags: Flags,
    ) -> Result<Vec<PatternMatch>> {
        self.compiled(pattern, flags, false)?;
        let mut matches = Vec::new();
        self.collect_matches(pattern, data, flags, &mut matches)?;
        Ok(matches)
    }

    fn collect_matches(
        &mut self,
        pattern: &str,
        data: &Value,
        flags: Flags,
        matches: &mut Vec<PatternMatch>,
    ) -> Result<()> {
        match data {
            Value::String(text) => {
                if let Some(found) = self.search_with(pattern, text, flags, Hooks::new())? {
                    matches.push(found);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.collect_matches(pattern, item, flags, matches)?;
                }
            }
            Value::Object(map) => {
                for value in map.values() {
                    self.collect_matches(pattern, value, flags, matches)?;
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
        Ok(())
    }
}
