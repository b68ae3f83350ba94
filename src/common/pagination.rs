// src/common/pagination.rs

use crate::common::error::AppError;

/// Paginação 1-based no padrão `page`/`rows` da API.
///
/// Uma coleção vazia ainda tem uma "última página" (a 1); pedir página
/// além da última é erro, nunca uma página silenciosamente vazia.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: i64,
    pub rows: i64,
}

impl Pagination {
    pub fn new(page: Option<u32>, rows: Option<u32>) -> Result<Self, AppError> {
        let page = i64::from(page.unwrap_or(1));
        let rows = i64::from(rows.unwrap_or(25));
        if rows < 1 {
            return Err(AppError::Validation("rows must be at least 1".to_string()));
        }
        Ok(Self { page, rows })
    }

    pub fn last_page(&self, total: i64) -> i64 {
        if total <= 0 {
            1
        } else {
            (total + self.rows - 1) / self.rows
        }
    }

    /// Valida a página pedida contra o total e devolve o OFFSET.
    pub fn offset(&self, total: i64) -> Result<i64, AppError> {
        if self.page < 1 || self.page > self.last_page(total) {
            return Err(AppError::PageOutOfRange);
        }
        Ok((self.page - 1) * self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page_of_25() {
        let p = Pagination::new(None, None).unwrap();
        assert_eq!(p.page, 1);
        assert_eq!(p.rows, 25);
    }

    #[test]
    fn rejects_zero_rows() {
        assert!(matches!(
            Pagination::new(Some(1), Some(0)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn last_page_rounds_up() {
        let p = Pagination::new(Some(1), Some(10)).unwrap();
        assert_eq!(p.last_page(0), 1);
        assert_eq!(p.last_page(10), 1);
        assert_eq!(p.last_page(11), 2);
        assert_eq!(p.last_page(25), 3);
    }

    #[test]
    fn empty_collection_still_has_page_one() {
        let p = Pagination::new(Some(1), Some(25)).unwrap();
        assert_eq!(p.offset(0).unwrap(), 0);
    }

    #[test]
    fn page_beyond_last_is_an_error_not_an_empty_page() {
        let p = Pagination::new(Some(3), Some(10)).unwrap();
        assert!(matches!(p.offset(15), Err(AppError::PageOutOfRange)));
    }

    #[test]
    fn offset_skips_previous_pages() {
        let p = Pagination::new(Some(3), Some(10)).unwrap();
        assert_eq!(p.offset(25).unwrap(), 20);
    }
}
