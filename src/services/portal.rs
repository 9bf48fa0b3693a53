//! Read-only LP views, scoped to the funds an LP has been granted.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::{DbPool, DbResult},
    models::{Company, Fund, FundMetrics, Investment, Update, UserProfile},
};

/// Link to one of the portal's sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortalSection {
    pub label: &'static str,
    pub href: String,
    pub description: &'static str,
}

/// Section links for the portal home, carrying the `fund` selection along.
pub fn portal_sections(fund_slug: Option<&str>) -> Vec<PortalSection> {
    let suffix = fund_query(fund_slug);
    [
        ("Fund Stats", "stats", "Performance metrics and historical data"),
        ("Portfolio", "portfolio", "Companies and investments"),
        ("Updates", "updates", "Latest updates from the team"),
    ]
    .into_iter()
    .map(|(label, path, description)| PortalSection {
        label,
        href: format!("/portal/{path}{suffix}"),
        description,
    })
    .collect()
}

/// `?fund=slug` for a selected fund, empty otherwise.
pub fn fund_query(fund_slug: Option<&str>) -> String {
    match fund_slug.filter(|s| !s.is_empty()) {
        Some(slug) => {
            let encoded: String = url::form_urlencoded::byte_serialize(slug.as_bytes()).collect();
            format!("?fund={encoded}")
        }
        None => String::new(),
    }
}

/// Pick the active fund: the requested slug when accessible, else the first.
pub fn choose_fund<'a>(funds: &'a [Fund], slug: Option<&str>) -> Option<&'a Fund> {
    slug.and_then(|slug| funds.iter().find(|f| f.slug == slug))
        .or_else(|| funds.first())
}

#[derive(Debug, Clone, Serialize)]
pub struct Portfolio {
    pub companies: Vec<Company>,
    pub investments: Vec<Investment>,
}

#[derive(Clone)]
pub struct PortalService {
    db: Arc<DbPool>,
}

impl PortalService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Funds granted to the profile's allow-list entry, ordered by slug.
    ///
    /// A profile without an allow-list entry has no portal funds.
    pub async fn accessible_funds(&self, profile: &UserProfile) -> DbResult<Vec<Fund>> {
        match profile.allowed_lp_id {
            Some(allowed_lp_id) => self.db.funds().list_for_allowed_lp(allowed_lp_id).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn stats(&self, fund_id: Uuid) -> DbResult<Vec<FundMetrics>> {
        self.db.fund_metrics().list_for_fund(fund_id).await
    }

    pub async fn portfolio(&self, fund_id: Uuid) -> DbResult<Portfolio> {
        Ok(Portfolio {
            companies: self.db.companies().list_for_fund(fund_id).await?,
            investments: self.db.investments().list_for_fund(fund_id).await?,
        })
    }

    /// Published updates visible to a fund, newest first.
    pub async fn updates(&self, fund_id: Uuid) -> DbResult<Vec<Update>> {
        self.db.updates().list_published_for_fund(fund_id).await
    }

    /// An update the profile may read: published and visible to one of its funds.
    pub async fn update_detail(&self, profile: &UserProfile, id: Uuid) -> DbResult<Option<Update>> {
        let Some(update) = self.db.updates().get_by_id(id).await? else {
            return Ok(None);
        };

        let fund_ids: Vec<Uuid> = self
            .accessible_funds(profile)
            .await?
            .into_iter()
            .map(|f| f.id)
            .collect();

        Ok(update.is_visible_to_any(&fund_ids).then_some(update))
    }
}
