use crate::dispatch::PatternMatch;
use std::borrow::Cow;

pub type PreHook<'a> = Box<dyn Fn(&str) -> String + 'a>;
pub type PostHook<'a> = Box<dyn FnMut(&PatternMatch) + 'a>;

/// Optional hooks around a single search or match.
///
/// `pre` rewrites the haystack before matching. `post` sees the finished
/// match after every placeholder capture has been dispatched.
#[derive(Default)]
pub struct Hooks<'a> {
    pre: Option<PreHook<'a>>,
    post: Option<PostHook<'a>>,
}

impl<'a> Hooks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pre(mut self, hook: impl Fn(&str) -> String + 'a) -> Self {
        self.pre = Some(Box::new(hook));
        self
    }

    pub fn post(mut self, hook: impl FnMut(&PatternMatch) + 'a) -> Self {
        self.post = Some(Box::new(hook));
        self
    }

    pub(crate) fn preprocess<'h>(&self, haystack: &'h str) -> Cow<'h, str> {
        match &self.pre {
            Some(pre) => Cow::Owned(pre(haystack)),
            None => Cow::Borrowed(haystack),
        }
    }

    pub(crate) fn postprocess(&mut self, found: &PatternMatch) {
        if let Some(post) = self.post.as_mut() {
            post(found);
        }
    }
}
