//! String helpers for cell values

/// String cleanup extension trait
pub trait StringExt {
    /// Trimmed copy, `None` when nothing is left
    fn clean(&self) -> Option<String>;
}

impl StringExt for str {
    #[inline]
    fn clean(&self) -> Option<String> {
        let trimmed = self.trim();
        if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
    }
}
