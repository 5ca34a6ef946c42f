use sea_orm::{DeriveActiveEnum, EnumIter, FromJsonQueryResult};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use utoipa::ToSchema;

/// Lifecycle status of a microsite.
/// NOTE: Use db_type = "Text" for SQLite compatibility.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DeriveActiveEnum, EnumIter, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum MicrositeStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "published")]
    Published,
    #[sea_orm(string_value = "archived")]
    Archived,
}

impl Display for MicrositeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MicrositeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MicrositeStatus::Draft => "draft",
            MicrositeStatus::Published => "published",
            MicrositeStatus::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(MicrositeStatus::Draft),
            "published" => Some(MicrositeStatus::Published),
            "archived" => Some(MicrositeStatus::Archived),
            _ => None,
        }
    }
}

/// Kind of account that owns a microsite.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DeriveActiveEnum, EnumIter, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum OwnerType {
    #[sea_orm(string_value = "club")]
    Club,
    #[sea_orm(string_value = "state_committee")]
    StateCommittee,
    #[sea_orm(string_value = "partner")]
    Partner,
}

impl Display for OwnerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OwnerType::Club => "club",
            OwnerType::StateCommittee => "state_committee",
            OwnerType::Partner => "partner",
        };
        write!(f, "{s}")
    }
}

/// Presentation type of a content block. Immutable after creation; changing
/// the presentation is modeled as delete + create.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ContentBlockType {
    #[sea_orm(string_value = "text")]
    Text,
    #[sea_orm(string_value = "image")]
    Image,
    #[sea_orm(string_value = "gallery")]
    Gallery,
    #[sea_orm(string_value = "video")]
    Video,
    #[sea_orm(string_value = "contact")]
    Contact,
    #[sea_orm(string_value = "map")]
    Map,
    #[sea_orm(string_value = "court_list")]
    CourtList,
    #[sea_orm(string_value = "tournament_list")]
    TournamentList,
    #[sea_orm(string_value = "calendar")]
    Calendar,
    #[sea_orm(string_value = "custom_html")]
    CustomHtml,
}

/// Color scheme driving the generated theme CSS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct ColorScheme {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub text: String,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            primary: "#1a5632".to_string(),
            secondary: "#ffffff".to_string(),
            accent: "#d4a017".to_string(),
            background: "#f5f5f5".to_string(),
            text: "#212121".to_string(),
        }
    }
}

/// SEO metadata block. Title and description gate publishing.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, FromJsonQueryResult,
)]
#[serde(rename_all = "camelCase")]
pub struct SeoMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_image: Option<String>,
}

/// Contact information shown on the microsite. The publish gate requires at
/// least one of email or phone.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, FromJsonQueryResult,
)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
}

impl ContactInfo {
    /// True when at least one direct contact channel is populated.
    pub fn is_reachable(&self) -> bool {
        let has = |field: &Option<String>| {
            field
                .as_deref()
                .map(|s| !s.trim().is_empty())
                .unwrap_or(false)
        };
        has(&self.email) || has(&self.phone)
    }
}

/// Per-microsite feature toggles. Disabled features render as empty blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct FeatureToggles {
    pub contact_form: bool,
    pub calendar: bool,
    pub directory: bool,
    pub gallery: bool,
    pub news: bool,
    pub social: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            contact_form: true,
            calendar: true,
            directory: true,
            gallery: true,
            news: true,
            social: true,
        }
    }
}

impl FeatureToggles {
    /// Whether blocks of the given type should render for this microsite.
    pub fn allows(&self, block_type: ContentBlockType) -> bool {
        match block_type {
            ContentBlockType::Gallery | ContentBlockType::Image => self.gallery,
            ContentBlockType::Calendar => self.calendar,
            ContentBlockType::Contact => self.contact_form,
            ContentBlockType::CourtList | ContentBlockType::TournamentList => self.directory,
            ContentBlockType::Text
            | ContentBlockType::Video
            | ContentBlockType::Map
            | ContentBlockType::CustomHtml => true,
        }
    }
}

/// Typed content payload of a block, keyed by the block's stored type.
///
/// Payloads are schema-free at rest (a JSON column) and validated when the
/// renderer interprets them. Every `ContentBlockType` has exactly one variant
/// here, which keeps renderer support exhaustive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum BlockContent {
    Text {
        #[serde(default)]
        heading: Option<String>,
        #[serde(default)]
        body: String,
    },
    Image {
        url: String,
        #[serde(default)]
        alt: Option<String>,
        #[serde(default)]
        caption: Option<String>,
    },
    Gallery {
        #[serde(default)]
        images: Vec<GalleryImage>,
    },
    Video {
        url: String,
        #[serde(default)]
        title: Option<String>,
    },
    Contact {
        #[serde(default)]
        heading: Option<String>,
    },
    Map {
        latitude: f64,
        longitude: f64,
        #[serde(default)]
        label: Option<String>,
    },
    CourtList {
        #[serde(default)]
        court_ids: Vec<i32>,
    },
    TournamentList {
        #[serde(default)]
        tournament_ids: Vec<i32>,
    },
    Calendar {
        #[serde(default)]
        calendar_id: Option<String>,
    },
    CustomHtml {
        html: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GalleryImage {
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
}

impl BlockContent {
    /// Parse a raw stored payload against the block's declared type.
    pub fn from_parts(
        block_type: ContentBlockType,
        content: &serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        let tagged = serde_json::json!({
            "type": type_tag(block_type),
            "content": content,
        });
        serde_json::from_value(tagged)
    }

    /// The block type this payload belongs to.
    pub fn block_type(&self) -> ContentBlockType {
        match self {
            BlockContent::Text { .. } => ContentBlockType::Text,
            BlockContent::Image { .. } => ContentBlockType::Image,
            BlockContent::Gallery { .. } => ContentBlockType::Gallery,
            BlockContent::Video { .. } => ContentBlockType::Video,
            BlockContent::Contact { .. } => ContentBlockType::Contact,
            BlockContent::Map { .. } => ContentBlockType::Map,
            BlockContent::CourtList { .. } => ContentBlockType::CourtList,
            BlockContent::TournamentList { .. } => ContentBlockType::TournamentList,
            BlockContent::Calendar { .. } => ContentBlockType::Calendar,
            BlockContent::CustomHtml { .. } => ContentBlockType::CustomHtml,
        }
    }
}

fn type_tag(block_type: ContentBlockType) -> &'static str {
    match block_type {
        ContentBlockType::Text => "text",
        ContentBlockType::Image => "image",
        ContentBlockType::Gallery => "gallery",
        ContentBlockType::Video => "video",
        ContentBlockType::Contact => "contact",
        ContentBlockType::Map => "map",
        ContentBlockType::CourtList => "court_list",
        ContentBlockType::TournamentList => "tournament_list",
        ContentBlockType::Calendar => "calendar",
        ContentBlockType::CustomHtml => "custom_html",
    }
}
