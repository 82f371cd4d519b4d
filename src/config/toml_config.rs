use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::app::geocoding::AddressFormat;
use crate::domain::model::Region;
use crate::extraction::{
    AcceptanceGate, BlockModePolicy, CityHeaderStrategy, LineClassifier, TokenModePolicy,
};
use crate::extraction::classifier::{EmailStyle, PhoneStyle};
use crate::utils::error::{DirectoryError, Result};
use crate::utils::validation::{self, Validate};

pub const DEFAULT_CONFIG_FILE: &str = "quilt-shops.toml";
pub const DEFAULT_USER_AGENT: &str = "quilt-shops/0.1 (quilt shop directory builder)";
/// Nominatim usage policy allows one request per second.
const MIN_GEOCODE_INTERVAL_MS: u64 = 1000;

static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Whole-program settings. Every section is optional in the file; the
/// defaults describe the California page and the 2025 Virginia PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub html_source: HtmlSourceConfig,
    pub pdf_source: PdfSourceConfig,
    pub geocoder: GeocoderConfig,
    pub merge: MergeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlSourceConfig {
    pub url: String,
    pub state: String,
    pub database_path: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub lookahead_lines: usize,
    pub acceptance: AcceptanceGate,
    pub deduplicate: bool,
    /// Bold text on the page that is navigation, not a shop name.
    pub skip_names: Vec<String>,
    pub address_format: AddressFormat,
}

impl Default for HtmlSourceConfig {
    fn default() -> Self {
        Self {
            url: "https://ronatheribbiter.com/quilt-shops-california/".to_string(),
            state: "CA".to_string(),
            database_path: "data/california.db".to_string(),
            timeout_seconds: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            lookahead_lines: 4,
            acceptance: AcceptanceGate::AddressOrPhone,
            deduplicate: true,
            skip_names: strings(&[
                "click here",
                "related posts",
                "quilt shop lists",
                "list of quilt shows",
                "quilt shops",
                "find a quilt shop",
                "california",
                "big quilter's bucket list",
                "planning your next quilting adventure",
                "travel tips for your next road trip",
                "create a realistic road trip budget",
                "traveling quilters group",
                "facebook",
                "more on the blog",
                "from the e-store",
                "quilt shop lists in the us",
            ]),
            address_format: AddressFormat::AsIs,
        }
    }
}

impl HtmlSourceConfig {
    pub fn classifier(&self) -> LineClassifier {
        LineClassifier::html_block()
    }

    pub fn policy(&self) -> BlockModePolicy {
        BlockModePolicy::new(self.acceptance, self.deduplicate, self.lookahead_lines)
            .with_skip_names(&self.skip_names)
    }

    pub fn region(&self) -> Region {
        Region {
            state: self.state.clone(),
            database_path: self.database_path.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfSourceConfig {
    pub url: String,
    pub state: String,
    pub database_path: String,
    /// Directory the downloaded PDF is cached in.
    pub storage_dir: String,
    pub cache_file: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub pdftotext_program: String,
    pub max_address_fragments: usize,
    pub acceptance: AcceptanceGate,
    pub deduplicate: bool,
    pub city_headers: CityHeaderStrategy,
    pub known_cities: Vec<String>,
    /// Whole lines dropped before classification (page headers, footers).
    pub skip_lines: Vec<String>,
    /// Short capitalized lines that look like city headings but are not.
    pub non_city_phrases: Vec<String>,
    pub address_format: AddressFormat,
}

impl Default for PdfSourceConfig {
    fn default() -> Self {
        Self {
            url: "https://vcq.org/wp-content/uploads/2025/03/2025_3-V1.0-Quilt-Shop-List.pdf"
                .to_string(),
            state: "VA".to_string(),
            database_path: "data/virginia.db".to_string(),
            storage_dir: "data".to_string(),
            cache_file: "virginia-quilt-shops.pdf".to_string(),
            timeout_seconds: 60,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            pdftotext_program: "pdftotext".to_string(),
            max_address_fragments: 4,
            acceptance: AcceptanceGate::AnyContact,
            deduplicate: false,
            city_headers: CityHeaderStrategy::ShortTitleCase,
            known_cities: Vec::new(),
            skip_lines: strings(&["Quilt Shops", "2025-V1.0"]),
            non_city_phrases: strings(&[
                "Closed Sunday",
                "Events",
                "Hours",
                "Classes",
                "Services",
                "Machines",
                "Founded",
                "Located",
                "Open",
                "Spreading",
                "Emily Isaman",
                "Owner",
                "Becky Garriner",
                "Louann Gram",
                "Authorized",
            ]),
            address_format: AddressFormat::AppendCityState,
        }
    }
}

impl PdfSourceConfig {
    pub fn classifier(&self) -> Result<LineClassifier> {
        Ok(LineClassifier::new(PhoneStyle::Anchored, EmailStyle::Strict)
            .with_websites()
            .with_terminator_state(&self.state)?
            .with_city_headers(self.city_headers, &self.known_cities)
            .with_non_city_phrases(self.non_city_phrases.iter().cloned())
            .with_skip_lines(self.skip_lines.iter().cloned()))
    }

    pub fn policy(&self) -> TokenModePolicy {
        TokenModePolicy {
            gate: self.acceptance,
            deduplicate: self.deduplicate,
            max_address_fragments: self.max_address_fragments,
        }
    }

    pub fn region(&self) -> Region {
        Region {
            state: self.state.clone(),
            database_path: self.database_path.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Minimum spacing between requests; the public Nominatim allows one per second.
    pub min_interval_ms: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: crate::adapters::nominatim::DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: 10,
            min_interval_ms: MIN_GEOCODE_INTERVAL_MS,
        }
    }
}

impl GeocoderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub output_path: String,
    /// Databases to combine. When unset, the two source databases are used.
    pub sources: Option<Vec<Region>>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            output_path: "data/quilt_shops.db".to_string(),
            sources: None,
        }
    }
}

impl DirectoryConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| DirectoryError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Loads `path` if given, else `quilt-shops.toml` when present, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                tracing::debug!("using {}", DEFAULT_CONFIG_FILE);
                Self::from_file(DEFAULT_CONFIG_FILE)
            }
            None => Ok(Self::default()),
        }
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn merge_sources(&self) -> Vec<Region> {
        self.merge
            .sources
            .clone()
            .unwrap_or_else(|| vec![self.html_source.region(), self.pdf_source.region()])
    }

    pub fn validate_config(&self) -> Result<()> {
        let html = &self.html_source;
        validation::validate_url("html_source.url", &html.url)?;
        validation::validate_state_code("html_source.state", &html.state)?;
        validation::validate_path("html_source.database_path", &html.database_path)?;
        validation::validate_positive_number(
            "html_source.timeout_seconds",
            html.timeout_seconds as usize,
            1,
        )?;
        validation::validate_range("html_source.lookahead_lines", html.lookahead_lines, 1, 20)?;

        let pdf = &self.pdf_source;
        validation::validate_url("pdf_source.url", &pdf.url)?;
        validation::validate_state_code("pdf_source.state", &pdf.state)?;
        validation::validate_path("pdf_source.database_path", &pdf.database_path)?;
        validation::validate_path("pdf_source.storage_dir", &pdf.storage_dir)?;
        validation::validate_non_empty_string("pdf_source.cache_file", &pdf.cache_file)?;
        validation::validate_non_empty_string(
            "pdf_source.pdftotext_program",
            &pdf.pdftotext_program,
        )?;
        validation::validate_positive_number(
            "pdf_source.timeout_seconds",
            pdf.timeout_seconds as usize,
            1,
        )?;
        validation::validate_range(
            "pdf_source.max_address_fragments",
            pdf.max_address_fragments,
            1,
            16,
        )?;
        if pdf.city_headers == CityHeaderStrategy::KnownCities && pdf.known_cities.is_empty() {
            return Err(DirectoryError::MissingConfigError {
                field: "pdf_source.known_cities".to_string(),
            });
        }

        let geocoder = &self.geocoder;
        validation::validate_url("geocoder.endpoint", &geocoder.endpoint)?;
        validation::validate_non_empty_string("geocoder.user_agent", &geocoder.user_agent)?;
        validation::validate_positive_number(
            "geocoder.timeout_seconds",
            geocoder.timeout_seconds as usize,
            1,
        )?;
        validation::validate_range(
            "geocoder.min_interval_ms",
            geocoder.min_interval_ms,
            MIN_GEOCODE_INTERVAL_MS,
            60_000,
        )?;

        validation::validate_path("merge.output_path", &self.merge.output_path)?;
        for (index, region) in self.merge_sources().iter().enumerate() {
            validation::validate_state_code(
                &format!("merge.sources[{}].state", index),
                &region.state,
            )?;
            validation::validate_path(
                &format!("merge.sources[{}].database_path", index),
                &region.database_path,
            )?;
        }

        Ok(())
    }
}

impl Validate for DirectoryConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
