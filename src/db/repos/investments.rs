use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{CreateInvestment, FieldValue, Investment, InvestmentField},
};

#[async_trait]
pub trait InvestmentRepo: Send + Sync {
    async fn create(&self, input: CreateInvestment) -> DbResult<Investment>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Investment>>;
    /// All investments, newest first.
    async fn list(&self) -> DbResult<Vec<Investment>>;
    /// Investments made by a fund, newest first.
    async fn list_for_fund(&self, fund_id: Uuid) -> DbResult<Vec<Investment>>;
    async fn update_field(
        &self,
        id: Uuid,
        field: InvestmentField,
        value: FieldValue,
    ) -> DbResult<()>;
    async fn delete(&self, id: Uuid) -> DbResult<()>;
}
