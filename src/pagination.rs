//! `skip`/`take` pagination shared by list endpoints

use serde::Deserialize;

pub const DEFAULT_TAKE: i64 = 10;
pub const MAX_TAKE: i64 = 100;

/// Raw query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub skip: Option<i64>,
    #[serde(default)]
    pub take: Option<i64>,
}

/// Clamped offset/limit pair ready for SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl PageQuery {
    pub fn page(&self) -> Page {
        let offset = self.skip.unwrap_or(0).max(0);
        let limit = match self.take {
            Some(take) if take > 0 => take.min(MAX_TAKE),
            _ => DEFAULT_TAKE,
        };
        Page { offset, limit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(
            PageQuery::default().page(),
            Page {
                offset: 0,
                limit: DEFAULT_TAKE
            }
        );
    }

    #[test]
    fn test_take_is_capped_and_negative_values_ignored() {
        let page = PageQuery {
            skip: Some(-5),
            take: Some(1_000),
        }
        .page();
        assert_eq!(page, Page { offset: 0, limit: MAX_TAKE });

        let page = PageQuery {
            skip: Some(20),
            take: Some(0),
        }
        .page();
        assert_eq!(page, Page { offset: 20, limit: DEFAULT_TAKE });
    }
}
