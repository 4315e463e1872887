use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::{ProductCatalog, ProductRef};
use crate::schema::products;

use super::models::ProductRow;

pub struct DieselProductCatalog {
    pool: DbPool,
}

impl DieselProductCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ProductCatalog for DieselProductCatalog {
    fn find_product(&self, id: Uuid) -> Result<Option<ProductRef>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(|p| ProductRef {
            id: p.id,
            name: p.name,
            price: p.price,
        }))
    }
}
