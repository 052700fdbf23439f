use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ==========================================
// Fixed Catalogs
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sector {
    #[serde(rename = "Agro Processing")]
    AgroProcessing,
    #[serde(rename = "Food Tech")]
    FoodTech,
    #[serde(rename = "Organic Farming")]
    OrganicFarming,
    #[serde(rename = "Dairy & Animal Husbandry")]
    DairyAnimalHusbandry,
    #[serde(rename = "Horticulture")]
    Horticulture,
    #[serde(rename = "Agricultural Equipment")]
    AgriculturalEquipment,
    #[serde(rename = "Crop Production")]
    CropProduction,
    #[serde(rename = "Sustainable Agriculture")]
    SustainableAgriculture,
    #[serde(rename = "Aquaculture")]
    Aquaculture,
    #[serde(rename = "Forestry")]
    Forestry,
}

impl Sector {
    pub const ALL: [Sector; 10] = [
        Sector::AgroProcessing,
        Sector::FoodTech,
        Sector::OrganicFarming,
        Sector::DairyAnimalHusbandry,
        Sector::Horticulture,
        Sector::AgriculturalEquipment,
        Sector::CropProduction,
        Sector::SustainableAgriculture,
        Sector::Aquaculture,
        Sector::Forestry,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Sector::AgroProcessing => "Agro Processing",
            Sector::FoodTech => "Food Tech",
            Sector::OrganicFarming => "Organic Farming",
            Sector::DairyAnimalHusbandry => "Dairy & Animal Husbandry",
            Sector::Horticulture => "Horticulture",
            Sector::AgriculturalEquipment => "Agricultural Equipment",
            Sector::CropProduction => "Crop Production",
            Sector::SustainableAgriculture => "Sustainable Agriculture",
            Sector::Aquaculture => "Aquaculture",
            Sector::Forestry => "Forestry",
        }
    }

    pub fn parse(raw: &str) -> Option<Sector> {
        Sector::ALL.iter().copied().find(|s| s.label() == raw)
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundingType {
    #[serde(rename = "Term Loan")]
    TermLoan,
    Equity,
    Subsidy,
    Grant,
}

impl FundingType {
    pub const ALL: [FundingType; 4] = [
        FundingType::TermLoan,
        FundingType::Equity,
        FundingType::Subsidy,
        FundingType::Grant,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FundingType::TermLoan => "Term Loan",
            FundingType::Equity => "Equity",
            FundingType::Subsidy => "Subsidy",
            FundingType::Grant => "Grant",
        }
    }

    pub fn parse(raw: &str) -> Option<FundingType> {
        FundingType::ALL.iter().copied().find(|t| t.label() == raw)
    }
}

impl fmt::Display for FundingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "INR")]
    Inr,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Inr, Currency::Usd, Currency::Eur, Currency::Gbp];

    pub fn label(self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }

    pub fn parse(raw: &str) -> Option<Currency> {
        Currency::ALL.iter().copied().find(|c| c.label() == raw)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn currency_symbol(code: &str) -> &'static str {
    match code {
        "INR" => "₹",
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        _ => "",
    }
}

// ==========================================
// Draft & Field Edits
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    ShortDescription,
    Location,
    Sector,
    ProductionCapacity,
    Currency,
    EstimatedCost,
    PromoterName,
    ContactEmail,
    ContactPhone,
    EmploymentGenerated,
    ProjectDuration,
    FundingRequired,
    FundingType,
    LandArea,
    InfrastructureDetails,
    TechnologyUsed,
    ExpectedRevenueYear1,
    ExpectedRevenueYear2,
    ExpectedRevenueYear3,
}

impl Field {
    pub fn kind(self) -> InputKind {
        match self {
            Field::ProductionCapacity
            | Field::EstimatedCost
            | Field::EmploymentGenerated
            | Field::ProjectDuration
            | Field::FundingRequired
            | Field::ExpectedRevenueYear1
            | Field::ExpectedRevenueYear2
            | Field::ExpectedRevenueYear3 => InputKind::Number,
            _ => InputKind::Text,
        }
    }
}

// Anything that does not parse as a number becomes 0.0; a stored value is
// never NaN and never the raw string.
fn parse_number(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| !n.is_nan())
        .unwrap_or(0.0)
}

/// The in-progress, not-yet-submitted project record held in form state.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDraft {
    pub title: String,
    pub short_description: String,
    pub location: String,
    pub sector: Option<Sector>,
    pub production_capacity: f64,
    pub currency: Currency,
    pub estimated_cost: f64,
    pub promoter_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub employment_generated: f64,
    pub project_duration: f64,
    pub objectives: Vec<String>,
    pub funding_required: f64,
    pub funding_type: Option<FundingType>,
    pub land_area: String,
    pub infrastructure_details: String,
    pub technology_used: String,
    pub expected_revenue_year1: f64,
    pub expected_revenue_year2: f64,
    pub expected_revenue_year3: f64,
}

impl Default for ProjectDraft {
    fn default() -> Self {
        ProjectDraft {
            title: String::new(),
            short_description: String::new(),
            location: String::new(),
            sector: None,
            production_capacity: 0.0,
            currency: Currency::Inr,
            estimated_cost: 0.0,
            promoter_name: String::new(),
            contact_email: String::new(),
            contact_phone: String::new(),
            employment_generated: 0.0,
            project_duration: 0.0,
            objectives: vec![String::new()],
            funding_required: 0.0,
            funding_type: None,
            land_area: String::new(),
            infrastructure_details: String::new(),
            technology_used: String::new(),
            expected_revenue_year1: 0.0,
            expected_revenue_year2: 0.0,
            expected_revenue_year3: 0.0,
        }
    }
}

impl ProjectDraft {
    /// Applies one named-field edit and returns the updated draft.
    pub fn with_field(mut self, field: Field, raw: &str) -> Self {
        if field.kind() == InputKind::Number {
            let value = parse_number(raw);
            match field {
                Field::ProductionCapacity => self.production_capacity = value,
                Field::EstimatedCost => self.estimated_cost = value,
                Field::EmploymentGenerated => self.employment_generated = value,
                Field::ProjectDuration => self.project_duration = value,
                Field::FundingRequired => self.funding_required = value,
                Field::ExpectedRevenueYear1 => self.expected_revenue_year1 = value,
                Field::ExpectedRevenueYear2 => self.expected_revenue_year2 = value,
                Field::ExpectedRevenueYear3 => self.expected_revenue_year3 = value,
                _ => unreachable!("text field routed as number"),
            }
            return self;
        }
        match field {
            Field::Title => self.title = raw.to_string(),
            Field::ShortDescription => self.short_description = raw.to_string(),
            Field::Location => self.location = raw.to_string(),
            Field::Sector => self.sector = Sector::parse(raw),
            Field::Currency => self.currency = Currency::parse(raw).unwrap_or(Currency::Inr),
            Field::PromoterName => self.promoter_name = raw.to_string(),
            Field::ContactEmail => self.contact_email = raw.to_string(),
            Field::ContactPhone => self.contact_phone = raw.to_string(),
            Field::FundingType => self.funding_type = FundingType::parse(raw),
            Field::LandArea => self.land_area = raw.to_string(),
            Field::InfrastructureDetails => self.infrastructure_details = raw.to_string(),
            Field::TechnologyUsed => self.technology_used = raw.to_string(),
            _ => unreachable!("number field routed as text"),
        }
        self
    }

    /// Builds the wire envelope the generation backend expects: title, short
    /// description, location, capacity and currency at the top level, every
    /// remaining field nested under `additional`.
    pub fn to_request(&self) -> GenerationRequest {
        GenerationRequest {
            title: self.title.clone(),
            short_description: self.short_description.clone(),
            location: if self.location.is_empty() {
                None
            } else {
                Some(self.location.clone())
            },
            capacity: self.production_capacity,
            currency: self.currency,
            additional: AdditionalDetails {
                sector: self.sector.map(|s| s.label().to_string()).unwrap_or_default(),
                estimated_cost: self.estimated_cost,
                promoter_name: self.promoter_name.clone(),
                contact_email: self.contact_email.clone(),
                contact_phone: self.contact_phone.clone(),
                employment_generated: self.employment_generated,
                project_duration: self.project_duration,
                objectives: self.objectives.clone(),
                funding_required: self.funding_required,
                funding_type: self
                    .funding_type
                    .map(|t| t.label().to_string())
                    .unwrap_or_default(),
                land_area: self.land_area.clone(),
                infrastructure_details: self.infrastructure_details.clone(),
                technology_used: self.technology_used.clone(),
                expected_revenue_year1: self.expected_revenue_year1,
                expected_revenue_year2: self.expected_revenue_year2,
                expected_revenue_year3: self.expected_revenue_year3,
            },
        }
    }
}

// ==========================================
// Wire Shapes
// ==========================================

#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub title: String,
    pub short_description: String,
    pub location: Option<String>,
    pub capacity: f64,
    pub currency: Currency,
    pub additional: AdditionalDetails,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdditionalDetails {
    pub sector: String,
    pub estimated_cost: f64,
    pub promoter_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub employment_generated: f64,
    pub project_duration: f64,
    pub objectives: Vec<String>,
    pub funding_required: f64,
    pub funding_type: String,
    pub land_area: String,
    pub infrastructure_details: String,
    pub technology_used: String,
    pub expected_revenue_year1: f64,
    pub expected_revenue_year2: f64,
    pub expected_revenue_year3: f64,
}

/// Response from the generation backend. Every field is optional; unknown
/// keys in the response body are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationResult {
    pub message: Option<String>,
    pub docx: Option<String>,
    pub pdf_summary: Option<String>,
    pub excel_financials: Option<String>,
    pub chart_image: Option<String>,
}

impl GenerationResult {
    /// The generic result recorded when a generation attempt fails.
    pub fn failure() -> Self {
        GenerationResult {
            message: Some("Failed to generate DPR. Check backend logs.".to_string()),
            ..Default::default()
        }
    }

    /// One download link per artifact path present in the result. Backslash
    /// separators in returned paths are rewritten to forward slashes.
    pub fn download_links(&self, base_url: &str) -> Vec<DownloadLink> {
        let mut links = Vec::new();
        let mut push = |label: &'static str, path: &Option<String>| {
            if let Some(path) = path {
                links.push(DownloadLink::new(label, base_url, path));
            }
        };
        push("DPR Document (.docx)", &self.docx);
        push("Project Summary (.pdf)", &self.pdf_summary);
        push("Financials (.xlsx)", &self.excel_financials);
        push("Chart (.png)", &self.chart_image);
        links
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub label: &'static str,
    pub path: String,
    pub url: String,
}

impl DownloadLink {
    fn new(label: &'static str, base_url: &str, raw_path: &str) -> Self {
        let path = raw_path.replace('\\', "/");
        let url = format!("{}/{}", base_url.trim_end_matches('/'), path);
        DownloadLink { label, path, url }
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("download")
    }
}

// ==========================================
// Persisted Records
// ==========================================

/// A project record read back from the datastore: the draft fields plus
/// identifier and timestamps.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersistedProject {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub title: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub production_capacity: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub estimated_cost: f64,
    #[serde(default)]
    pub promoter_name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub employment_generated: f64,
    #[serde(default)]
    pub project_duration: f64,
    #[serde(default, deserialize_with = "deserialize_objectives")]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub funding_required: f64,
    #[serde(default)]
    pub funding_type: String,
    #[serde(default)]
    pub land_area: String,
    #[serde(default)]
    pub infrastructure_details: String,
    #[serde(default)]
    pub technology_used: String,
    #[serde(default)]
    pub expected_revenue_year1: f64,
    #[serde(default)]
    pub expected_revenue_year2: f64,
    #[serde(default)]
    pub expected_revenue_year3: f64,
}

// Older rows store `objectives` as a JSON-encoded string, newer ones as a
// literal array. Both normalize to a list; absent or null becomes empty.
fn deserialize_objectives<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Encoded(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(Raw::List(list)) => Ok(list),
        Some(Raw::Encoded(text)) => serde_json::from_str(&text).map_err(serde::de::Error::custom),
    }
}

// ==========================================
// Contact
// ==========================================

#[derive(Debug, Clone, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_numeric_input_coerces_to_zero() {
        let draft = ProjectDraft::default()
            .with_field(Field::EstimatedCost, "twelve lakh")
            .with_field(Field::FundingRequired, "NaN")
            .with_field(Field::ProductionCapacity, " 250.5 ");
        assert_eq!(draft.estimated_cost, 0.0);
        assert_eq!(draft.funding_required, 0.0);
        assert_eq!(draft.production_capacity, 250.5);
    }

    #[test]
    fn request_splits_top_level_and_additional_fields() {
        let draft = ProjectDraft::default()
            .with_field(Field::Title, "Solar Dryer")
            .with_field(Field::ShortDescription, "Dries produce with solar heat")
            .with_field(Field::Location, "Pune")
            .with_field(Field::Sector, "Food Tech")
            .with_field(Field::ProductionCapacity, "100")
            .with_field(Field::Currency, "USD")
            .with_field(Field::FundingType, "Grant");

        let value = serde_json::to_value(draft.to_request()).unwrap();
        let top = value.as_object().unwrap();

        assert_eq!(top["title"], "Solar Dryer");
        assert_eq!(top["short_description"], "Dries produce with solar heat");
        assert_eq!(top["location"], "Pune");
        assert_eq!(top["capacity"], 100.0);
        assert_eq!(top["currency"], "USD");
        assert_eq!(top.len(), 6);

        let additional = top["additional"].as_object().unwrap();
        assert_eq!(additional.len(), 16);
        assert_eq!(additional["sector"], "Food Tech");
        assert_eq!(additional["funding_type"], "Grant");
        assert_eq!(additional["objectives"], serde_json::json!([""]));
        for key in [
            "estimated_cost",
            "promoter_name",
            "contact_email",
            "contact_phone",
            "employment_generated",
            "project_duration",
            "funding_required",
            "land_area",
            "infrastructure_details",
            "technology_used",
            "expected_revenue_year1",
            "expected_revenue_year2",
            "expected_revenue_year3",
        ] {
            assert!(additional.contains_key(key), "missing additional.{key}");
        }
    }

    #[test]
    fn empty_location_is_sent_as_null() {
        let request = ProjectDraft::default().to_request();
        assert_eq!(request.location, None);
        let value = serde_json::to_value(&request).unwrap();
        assert!(value["location"].is_null());
    }

    #[test]
    fn empty_result_yields_no_links() {
        let result = GenerationResult::default();
        assert!(result.download_links("http://localhost:8000").is_empty());
    }

    #[test]
    fn backslash_paths_normalize_in_links() {
        let result = GenerationResult {
            docx: Some("out\\report.docx".to_string()),
            ..Default::default()
        };
        let links = result.download_links("http://localhost:8000/");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "http://localhost:8000/out/report.docx");
        assert_eq!(links[0].file_name(), "report.docx");
    }

    #[test]
    fn unknown_result_keys_are_ignored() {
        let result: GenerationResult = serde_json::from_str(
            r#"{"message":"ok","docx":"out/report.docx","legacy_field":42}"#,
        )
        .unwrap();
        assert_eq!(result.message.as_deref(), Some("ok"));
        assert_eq!(result.docx.as_deref(), Some("out/report.docx"));
        assert!(result.pdf_summary.is_none());
    }

    #[test]
    fn objectives_normalize_from_encoded_string() {
        let record: PersistedProject = serde_json::from_str(
            r#"{
                "id": "p1",
                "title": "Cold Storage",
                "created_at": "2024-03-01T08:00:00Z",
                "objectives": "[\"Increase yield\",\"Create jobs\"]"
            }"#,
        )
        .unwrap();
        assert_eq!(record.objectives, vec!["Increase yield", "Create jobs"]);
    }

    #[test]
    fn objectives_pass_through_when_already_a_list() {
        let record: PersistedProject = serde_json::from_str(
            r#"{"id":"p2","title":"Drip Irrigation","objectives":["Save water"]}"#,
        )
        .unwrap();
        assert_eq!(record.objectives, vec!["Save water"]);
    }

    #[test]
    fn missing_objectives_default_to_empty() {
        let record: PersistedProject =
            serde_json::from_str(r#"{"id":"p3","title":"Seed Bank"}"#).unwrap();
        assert!(record.objectives.is_empty());
    }
}
