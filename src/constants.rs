/// Site and schema constants shared across the crawler, extractor and sink.

// Site defaults (overridable through config.toml)
pub const DEFAULT_BASE_URL: &str = "https://shadliq.az";
pub const DEFAULT_LANG: &str = "az";
pub const DEFAULT_CATEGORY_PATH: &str = "saray-restoranlar";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Path keywords of category, navigation and utility pages that are never venues.
pub const EXCLUDED_KEYWORDS: &[&str] = &[
    "elaqe",
    "videolar",
    "meslehetler",
    "gelinlikler",
    "gozellik-salonlari",
    "toy-masini",
    "dekorasiya-dizayn",
    "reqs-qruplari",
];

/// Pagination, taxonomy, query and fragment markers rejected by the URL filter.
pub const EXCLUDED_URL_MARKERS: &[&str] = &["/page/", "/category/", "?", "#"];

/// Fixed output column order. Every record serializes exactly these columns.
pub const COLUMNS: [&str; 16] = [
    "url",
    "name",
    "phone",
    "email",
    "address",
    "location_short",
    "latitude",
    "longitude",
    "price_per_person",
    "views",
    "description",
    "hall_names",
    "services",
    "event_types",
    "gallery_images",
    "meta_description",
];

/// Appended after `COLUMNS` when `output.include_capacity` is set.
pub const CAPACITY_COLUMNS: [&str; 2] = ["capacity_min", "capacity_max"];

/// Appended after the other columns when `output.include_contact_extras` is set.
pub const CONTACT_EXTRA_COLUMNS: [&str; 3] = ["working_hours", "website", "social_media"];

/// Link substrings that mark a social network profile.
pub const SOCIAL_NETWORKS: &[&str] = &["facebook", "instagram", "twitter", "youtube", "linkedin"];

/// Event keywords matched case-insensitively against the page text.
pub const EVENT_KEYWORDS: &[&str] = &[
    "Toy",
    "Nişan",
    "Xına",
    "Ad günü",
    "wedding",
    "engagement",
    "henna",
    "birthday",
];

// Page markers
pub const VIEWS_CUSTOMER_MARKER: &str = "müştəri";
pub const VIEWS_MARKER: &str = "baxış";
pub const HALLS_HEADER: &str = "ZALLAR";
pub const EVENTS_HEADER: &str = "TƏDBİRLƏR";
pub const COORDINATES_GLOBAL: &str = "ae_globals";
pub const MAP_LIBRARY: &str = "ymaps";
pub const UPLOAD_MARKER: &str = "upload";
pub const EMAIL_PROTECTION_PREFIX: &str = "/cdn-cgi/l/email-protection#";

// Field limits
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const META_DESCRIPTION_MAX_CHARS: usize = 500;
pub const HALL_NAMES_MAX_CHARS: usize = 200;
pub const GALLERY_CAP: usize = 15;
pub const SERVICE_LISTS_CAP: usize = 2;
pub const SERVICE_ITEMS_PER_LIST: usize = 10;
pub const SERVICE_ITEM_MAX_CHARS: usize = 100;
pub const SERVICES_CAP: usize = 15;
pub const DESCRIPTION_PARAGRAPHS_SCANNED: usize = 5;
pub const DESCRIPTION_PARAGRAPHS_KEPT: usize = 3;
pub const DESCRIPTION_PARAGRAPH_MIN_CHARS: usize = 20;
pub const WORKING_HOURS_MAX_CHARS: usize = 100;
pub const SOCIAL_LINKS_CAP: usize = 5;
pub const CHECKPOINT_EVERY: usize = 10;
