use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Rank,
    Name,
    Industry,
    MarketCap,
    Employees,
    Headquarters,
    Ceo,
}

impl SortField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rank => "rank",
            Self::Name => "name",
            Self::Industry => "industry",
            Self::MarketCap => "marketCap",
            Self::Employees => "employees",
            Self::Headquarters => "headquarters",
            Self::Ceo => "ceo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Headquarters {
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CeoProfile {
    pub name: String,
    pub birth_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtibContact {
    pub name: String,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Canonical company shape used everywhere after normalization. Every field
/// the filter/sort stages touch is a defined value, never an absent one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    pub id: String,
    pub rank: i64,
    pub name: String,
    pub industry: String,
    pub description: String,
    pub headquarters: Headquarters,
    pub employees: u64,
    pub market_cap_or_revenue: f64,
    pub website: Option<String>,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub logo_url: Option<String>,
    pub featured: bool,
    pub ceo: Option<CeoProfile>,
    pub rtib_contact: Option<RtibContact>,
}

/// Write model for company create/update. Field names serialize to the
/// store's legacy schema so documents written by this service read back
/// through the same alias table as documents written by older clients.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_activity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hq_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_employees: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_revenue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ceo_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ceo_birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtib_contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtib_contact_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtib_contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtib_contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_established: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// The explicit, serializable view query behind the directory pages. A pure
/// value object: the reducer in `view` is the only thing that changes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryState {
    pub search_text: String,
    pub industry_filter: Option<String>,
    pub city_filter: Option<String>,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub current_page: u32,
}

impl Default for DirectoryState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            industry_filter: None,
            city_filter: None,
            sort_field: SortField::Name,
            sort_direction: SortDirection::Asc,
            current_page: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DirectoryAction {
    SearchChanged(String),
    IndustrySelected(Option<String>),
    CitySelected(Option<String>),
    SortSelected(SortField),
    PageRequested(u32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub total_pages: u32,
    pub page: u32,
}

pub type DirectoryPage = Page<CompanyRecord>;
pub type UserPage = Page<UserRecord>;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    pub industries: Vec<String>,
    pub cities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoDefaults {
    pub city: String,
    pub country: String,
}

impl Default for GeoDefaults {
    fn default() -> Self {
        Self {
            city: "Unknown".to_string(),
            country: "Russia".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSettings {
    pub page_size: u32,
    pub geo_defaults: GeoDefaults,
    pub highlight_rank_threshold: i64,
    pub uploads_dir: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            page_size: 10,
            geo_defaults: GeoDefaults::default(),
            highlight_rank_threshold: 3,
            uploads_dir: "uploads".to_string(),
        }
    }
}

impl CompanyRecord {
    /// Top-ranked and featured rows get a visual highlight in the views.
    pub fn is_highlighted(&self, settings: &AppSettings) -> bool {
        (self.rank > 0 && self.rank <= settings.highlight_rank_threshold) || self.featured
    }
}
