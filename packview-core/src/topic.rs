//! Topic filter matching
//!
//! Topics are `/`-separated levels. Filters may use `+` for exactly one
//! level and `#` as the last level for "this level and everything below".
//! Topics starting with `$` are reserved and never matched by a wildcard
//! in the first level.

/// Invalid topic or filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TopicError {
    /// Empty string
    Empty,
    /// Wildcard mixed with other characters in a level
    MisplacedWildcard,
    /// `#` anywhere but the last level
    MultiLevelNotLast,
    /// Wildcard in a publish topic
    WildcardInTopic,
    /// Subscription table is full
    Full,
}

/// Check a subscription filter
pub fn validate_filter(filter: &str) -> Result<(), TopicError> {
    if filter.is_empty() {
        return Err(TopicError::Empty);
    }

    let mut levels = filter.split('/').peekable();
    while let Some(level) = levels.next() {
        match level {
            "#" if levels.peek().is_some() => return Err(TopicError::MultiLevelNotLast),
            "#" | "+" => {}
            other if other.contains(&['+', '#'][..]) => return Err(TopicError::MisplacedWildcard),
            _ => {}
        }
    }
    Ok(())
}

/// Check a publish topic
pub fn validate_topic(topic: &str) -> Result<(), TopicError> {
    if topic.is_empty() {
        return Err(TopicError::Empty);
    }
    if topic.contains(&['+', '#'][..]) {
        return Err(TopicError::WildcardInTopic);
    }
    Ok(())
}

/// Check whether `topic` matches `filter`
///
/// Both are assumed valid.
pub fn matches(filter: &str, topic: &str) -> bool {
    if topic.starts_with('$') && filter.starts_with(&['+', '#'][..]) {
        return false;
    }

    let mut filter_levels = filter.split('/');
    let mut topic_levels = topic.split('/');

    loop {
        match (filter_levels.next(), topic_levels.next()) {
            (Some("#"), _) => return true,
            (Some("+"), Some(_)) => {}
            (Some(f), Some(t)) if f == t => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}
