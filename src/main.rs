mod browser;
mod client;
mod form;
mod model;

use clap::{Parser, Subcommand};
use comfy_table::{Attribute, Cell, Table};
use directories::{BaseDirs, ProjectDirs};
use inquire::{Confirm, Select, Text};
use regex::Regex;
use serde::{Deserialize, Serialize};
use slug::slugify;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

use crate::browser::ProjectBrowser;
use crate::client::{GenerationClient, HttpProjectRepository};
use crate::form::SubmissionForm;
use crate::model::{
    ContactMessage, Currency, Field, FundingType, PersistedProject, Sector, currency_symbol,
};

// ==========================================
// Constants
// ==========================================

const OBJ_ADD: &str = "➕ Add Objective";
const OBJ_EDIT: &str = "✏️ Edit Objective";
const OBJ_REMOVE: &str = "🗑️ Remove Objective";
const OBJ_DONE: &str = "✅ Done";

const BROWSE_SEARCH: &str = "🔍 Search";
const BROWSE_SECTOR: &str = "📂 Filter by Sector";
const BROWSE_DETAILS: &str = "📄 View Details";
const BROWSE_CLEAR: &str = "♻️  Clear Filters";
const BROWSE_QUIT: &str = "🚪 Quit";

const ALL_SECTORS_OPT: &str = "All Sectors";

// ==========================================
// Structs & Enums
// ==========================================

#[derive(Debug, Serialize, Deserialize)]
struct AppSettings {
    backend_url: String,
    datastore_url: String,
    datastore_key: String,
    download_dir: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            backend_url: "http://localhost:8000".to_string(),
            datastore_url: String::new(),
            datastore_key: String::new(),
            download_dir: "~/Downloads/agrofund".to_string(),
        }
    }
}

#[derive(Parser)]
#[command(name = "agrofund")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a project and generate its DPR package
    Submit,
    /// Browse submitted projects
    Projects,
    /// Send a message to the support team
    Contact,
    /// Configure backend, datastore and download directory
    Config,
    /// Open the download folder
    Open,
}

// ==========================================
// Main Function
// ==========================================

fn main() {
    let cli = Cli::parse();

    let settings = load_settings().unwrap_or_else(setup_config_wizard);

    if cli.command.is_none() {
        use clap::CommandFactory;
        Cli::command().print_help().unwrap();
        return;
    }

    match cli.command.unwrap() {
        Commands::Submit => run_submit(&settings),
        Commands::Projects => run_projects(&settings),
        Commands::Contact => run_contact(),
        Commands::Config => {
            setup_config_wizard();
        }
        Commands::Open => open_download_dir(&settings),
    }
}

// ==========================================
// 1. Project Submission
// ==========================================

fn run_submit(settings: &AppSettings) {
    let mut form = SubmissionForm::new();

    println!("\n--- Basic Information ---");
    form.update_field(Field::Title, &prompt_required("Project Title:"));
    form.update_field(Field::ShortDescription, &prompt_required("Short Description:"));
    form.update_field(Field::Location, &prompt_required("Location (City, State):"));
    form.update_field(Field::Sector, &select_label("Sector:", &Sector::ALL));

    println!("\n--- Project Specifications ---");
    form.update_field(
        Field::ProductionCapacity,
        &prompt_number("Production Capacity (kg/day):", 0.0),
    );
    form.update_field(Field::LandArea, &prompt_required("Land Area (e.g. 5 acres, 2 hectares):"));
    form.update_field(
        Field::EmploymentGenerated,
        &prompt_number("Employment Generated (jobs):", 0.0),
    );
    form.update_field(
        Field::ProjectDuration,
        &prompt_number("Project Duration (months):", 1.0),
    );
    form.update_field(
        Field::InfrastructureDetails,
        &prompt_required("Infrastructure Details:"),
    );
    form.update_field(Field::TechnologyUsed, &prompt_required("Technology Used:"));

    println!("\n--- Financial Details ---");
    let currency = select_label("Currency:", &Currency::ALL);
    form.update_field(Field::Currency, &currency);
    form.update_field(
        Field::EstimatedCost,
        &prompt_number(&format!("Estimated Cost ({currency}):"), 0.0),
    );
    form.update_field(
        Field::FundingRequired,
        &prompt_number(&format!("Funding Required ({currency}):"), 0.0),
    );
    form.update_field(Field::FundingType, &select_label("Funding Type:", &FundingType::ALL));
    form.update_field(
        Field::ExpectedRevenueYear1,
        &prompt_number(&format!("Expected Revenue Year 1 ({currency}):"), 0.0),
    );
    form.update_field(
        Field::ExpectedRevenueYear2,
        &prompt_number(&format!("Expected Revenue Year 2 ({currency}):"), 0.0),
    );
    form.update_field(
        Field::ExpectedRevenueYear3,
        &prompt_number(&format!("Expected Revenue Year 3 ({currency}):"), 0.0),
    );

    println!("\n--- Contact Information ---");
    form.update_field(Field::PromoterName, &prompt_required("Promoter Name:"));
    form.update_field(Field::ContactEmail, &prompt_email("Contact Email:"));
    form.update_field(Field::ContactPhone, &prompt_required("Contact Phone:"));

    enter_objectives(&mut form);

    let preview = Confirm::new("Preview project summary before submitting?")
        .with_default(true)
        .prompt()
        .unwrap_or(false);
    if preview {
        form.set_preview_visible(true);
        if form.preview_visible() {
            println!("\n--- Project Preview ---");
            println!("{}", form.preview());
        }
        form.set_preview_visible(false);
    }

    let go = Confirm::new("Submit project for DPR generation?")
        .with_default(true)
        .prompt()
        .unwrap_or(false);
    if !go {
        println!("❌ Submission cancelled.");
        return;
    }

    let backend = GenerationClient::new(settings.backend_url.clone());
    println!("\n⏳ Submitting project to {} ...", backend.base_url());
    form.submit(&backend);

    if form.last_succeeded() {
        println!("✅ Project submitted successfully!");
    } else {
        println!("❌ Submission failed.");
    }
    if let Some(message) = form.result_message() {
        println!("💬 {message}");
    }

    let links = form.result_links(settings.backend_url.as_str());
    if links.is_empty() {
        return;
    }

    println!("\n--- Generated Project Documents ---");
    for link in &links {
        println!("📄 {} -> {}", link.label, link.url);
    }

    let download = Confirm::new("Download generated files now?")
        .with_default(true)
        .prompt()
        .unwrap_or(false);
    if download {
        let target_dir = PathBuf::from(expand_home_dir(&settings.download_dir))
            .join(slugify(&form.draft().title));
        for link in &links {
            let dest = target_dir.join(link.file_name());
            match backend.download_artifact(&link.url, &dest) {
                Ok(()) => println!("✅ Saved: {:?}", dest),
                Err(e) => println!("❌ Download failed for {}: {}", link.label, e),
            }
        }
    }
}

fn enter_objectives(form: &mut SubmissionForm) {
    println!("\n--- Project Objectives ---");
    form.update_objective(0, &prompt_required("Objective 1:"));

    loop {
        println!();
        for (i, objective) in form.draft().objectives.iter().enumerate() {
            println!("  {}. {}", i + 1, objective);
        }

        let mut options = vec![OBJ_ADD, OBJ_EDIT];
        if form.can_remove_objectives() {
            options.push(OBJ_REMOVE);
        }
        options.push(OBJ_DONE);

        let choice = match Select::new("Objectives:", options).prompt() {
            Ok(choice) => choice,
            Err(_) => return,
        };

        match choice {
            OBJ_ADD => {
                form.add_objective();
                let index = form.draft().objectives.len() - 1;
                form.update_objective(index, &prompt_required(&format!("Objective {}:", index + 1)));
            }
            OBJ_EDIT => {
                if let Some(index) = select_objective_index(form) {
                    form.update_objective(index, &prompt_required(&format!("Objective {}:", index + 1)));
                }
            }
            OBJ_REMOVE => {
                if let Some(index) = select_objective_index(form) {
                    form.remove_objective(index);
                }
            }
            _ => break,
        }
    }
}

fn select_objective_index(form: &SubmissionForm) -> Option<usize> {
    let options: Vec<String> = form
        .draft()
        .objectives
        .iter()
        .enumerate()
        .map(|(i, objective)| format!("{}. {}", i + 1, objective))
        .collect();
    Select::new("Which objective?", options)
        .raw_prompt()
        .ok()
        .map(|choice| choice.index)
}

// ==========================================
// 2. Project Browsing
// ==========================================

fn run_projects(settings: &AppSettings) {
    if settings.datastore_url.trim().is_empty() {
        println!("❌ No datastore configured. Run `agrofund config` first.");
        return;
    }

    println!("🔍 Loading projects...");
    let repo = HttpProjectRepository::new(
        settings.datastore_url.clone(),
        settings.datastore_key.clone(),
    );
    let mut browser = ProjectBrowser::new();
    browser.load(&repo);

    let mut search = String::new();
    let mut sector = String::new();

    loop {
        let matches = browser.filter(&search, &sector);
        render_project_table(&matches);
        println!("Showing {} of {} projects", matches.len(), browser.projects().len());

        let options = vec![BROWSE_SEARCH, BROWSE_SECTOR, BROWSE_DETAILS, BROWSE_CLEAR, BROWSE_QUIT];
        let choice = match Select::new("Browse:", options).prompt() {
            Ok(choice) => choice,
            Err(_) => return,
        };

        match choice {
            BROWSE_SEARCH => {
                search = Text::new("Search by title, location, or promoter:")
                    .with_default(&search)
                    .prompt()
                    .unwrap_or_default();
            }
            BROWSE_SECTOR => {
                let mut options = vec![ALL_SECTORS_OPT.to_string()];
                options.extend(
                    browser
                        .available_sectors()
                        .into_iter()
                        .filter(|s| !s.is_empty()),
                );
                match Select::new("Filter by sector:", options).prompt() {
                    Ok(choice) if choice != ALL_SECTORS_OPT => sector = choice,
                    Ok(_) => sector.clear(),
                    Err(_) => {}
                }
            }
            BROWSE_DETAILS => {
                if matches.is_empty() {
                    println!("(No projects to show)");
                    continue;
                }
                let options: Vec<String> = matches
                    .iter()
                    .map(|p| format!("{} | {}", p.title, p.location))
                    .collect();
                if let Ok(choice) = Select::new("Select Project:", options).raw_prompt() {
                    print_project_details(matches[choice.index]);
                }
            }
            BROWSE_CLEAR => {
                search.clear();
                sector.clear();
            }
            _ => return,
        }
    }
}

fn render_project_table(projects: &[&PersistedProject]) {
    if projects.is_empty() {
        println!("\n(No projects found matching your criteria.)");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Title").add_attribute(Attribute::Bold),
        Cell::new("Location"),
        Cell::new("Sector"),
        Cell::new("Funding Required"),
        Cell::new("Duration"),
        Cell::new("Promoter"),
        Cell::new("Submitted"),
    ]);

    for project in projects {
        table.add_row(vec![
            Cell::new(&project.title),
            Cell::new(&project.location),
            Cell::new(&project.sector),
            Cell::new(format_amount(project.funding_required, &project.currency)),
            Cell::new(format!("{:.0} months", project.project_duration)),
            Cell::new(&project.promoter_name),
            Cell::new(
                project
                    .created_at
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
        ]);
    }

    println!("{table}");
}

fn print_project_details(project: &PersistedProject) {
    println!("\n--- {} ---", project.title);
    println!("📍 {}", project.location);
    if !project.short_description.is_empty() {
        println!("{}", project.short_description);
    }
    println!("Sector: {} | Funding Type: {}", project.sector, project.funding_type);
    println!(
        "Estimated Cost: {} | Funding Required: {}",
        format_amount(project.estimated_cost, &project.currency),
        format_amount(project.funding_required, &project.currency)
    );
    println!(
        "Capacity: {:.0} kg/day | Land: {} | Duration: {:.0} months | Jobs: {:.0}",
        project.production_capacity,
        project.land_area,
        project.project_duration,
        project.employment_generated
    );
    if !project.objectives.is_empty() {
        println!("Objectives:");
        for (i, objective) in project.objectives.iter().enumerate() {
            println!("  {}. {}", i + 1, objective);
        }
    }
    println!(
        "Expected Revenue: Y1 {} | Y2 {} | Y3 {}",
        format_amount(project.expected_revenue_year1, &project.currency),
        format_amount(project.expected_revenue_year2, &project.currency),
        format_amount(project.expected_revenue_year3, &project.currency)
    );
    println!(
        "Promoter: {} ({} / {})",
        project.promoter_name, project.contact_email, project.contact_phone
    );
    if let Some(created) = project.created_at {
        println!("Submitted: {}", created.format("%Y-%m-%d"));
    }
}

fn format_amount(amount: f64, currency: &str) -> String {
    format!("{}{:.0}", currency_symbol(currency), amount)
}

// ==========================================
// 3. Contact
// ==========================================

fn run_contact() {
    println!("\n--- Contact Us ---");
    let message = ContactMessage {
        name: prompt_required("Full Name:"),
        email: prompt_email("Email Address:"),
        phone: Text::new("Phone Number (Optional):").prompt().unwrap_or_default(),
        subject: prompt_required("Subject:"),
        message: prompt_required("Message:"),
    };

    // The portal has no delivery endpoint yet; acknowledge like the web page.
    println!("\n✅ Thank you, {}! We'll get back to you soon.", message.name);
    println!("💬 Re: {}", message.subject);
}

// ==========================================
// 4. Data Entry Helpers
// ==========================================

fn prompt_required(label: &str) -> String {
    loop {
        let value = Text::new(label)
            .prompt()
            .unwrap_or_else(|_| std::process::exit(0));
        if !value.trim().is_empty() {
            return value;
        }
        println!("⚠️  This field is required.");
    }
}

fn prompt_number(label: &str, min: f64) -> String {
    let default = format!("{min:.0}");
    loop {
        let raw = Text::new(label)
            .with_default(&default)
            .prompt()
            .unwrap_or_else(|_| std::process::exit(0));
        let value: f64 = raw.trim().parse().unwrap_or(0.0);
        if value >= min {
            return raw;
        }
        println!("⚠️  Enter a number of at least {min}.");
    }
}

fn prompt_email(label: &str) -> String {
    let email_re = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    loop {
        let value = prompt_required(label);
        if email_re.is_match(value.trim()) {
            return value;
        }
        println!("⚠️  Enter a valid email address.");
    }
}

fn select_label<T: std::fmt::Display + Copy>(label: &str, options: &[T]) -> String {
    let items: Vec<String> = options.iter().map(|o| o.to_string()).collect();
    match Select::new(label, items).prompt() {
        Ok(choice) => choice,
        Err(_) => std::process::exit(0),
    }
}

// ==========================================
// 5. Config & Utilities
// ==========================================

fn get_config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("in", "agrofund", "portal") {
        let config_dir = proj_dirs.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).ok();
        }
        return config_dir.join("settings.toml");
    }
    PathBuf::from("settings.toml")
}

fn load_settings() -> Option<AppSettings> {
    let path = get_config_path();
    if !path.exists() {
        return None;
    }
    let content = fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

fn setup_config_wizard() -> AppSettings {
    println!("\n⚙️  --- Configuration Setup ---");
    let current = load_settings().unwrap_or_default();

    let backend_url = Text::new("Generation backend URL:")
        .with_default(&current.backend_url)
        .prompt()
        .unwrap_or_else(|_| std::process::exit(0));
    let datastore_url = Text::new("Datastore REST URL (blank to skip browsing):")
        .with_default(&current.datastore_url)
        .prompt()
        .unwrap_or_else(|_| std::process::exit(0));
    let datastore_key = Text::new("Datastore API key:")
        .with_default(&current.datastore_key)
        .prompt()
        .unwrap_or_else(|_| std::process::exit(0));

    println!("📂 Opening folder picker for downloads...");
    let picked_path = rfd::FileDialog::new()
        .set_title("Select Download Directory")
        .pick_folder();

    let download_dir = if let Some(path) = picked_path {
        path.to_string_lossy().to_string()
    } else {
        println!("❌ No folder selected. Falling back to manual input.");
        Text::new("Download directory:")
            .with_default(&current.download_dir)
            .prompt()
            .unwrap_or(current.download_dir)
    };

    let settings = AppSettings {
        backend_url,
        datastore_url,
        datastore_key,
        download_dir,
    };

    let path = get_config_path();
    let toml_str = toml::to_string_pretty(&settings).unwrap();
    fs::write(&path, toml_str).expect("Failed to save settings");
    println!("✅ Settings saved.");
    settings
}

fn expand_home_dir(path: &str) -> String {
    if path.starts_with("~") {
        if let Some(base_dirs) = BaseDirs::new() {
            let home = base_dirs.home_dir().to_string_lossy();
            return path.replacen("~", &home, 1);
        }
    }
    path.to_string()
}

fn open_download_dir(settings: &AppSettings) {
    let dir = PathBuf::from(expand_home_dir(&settings.download_dir));
    if let Err(e) = fs::create_dir_all(&dir) {
        eprintln!("❌ Error: Failed to create download directory: {}", e);
        return;
    }
    println!("🚀 Opening: {:?}", dir);

    #[cfg(target_os = "macos")]
    Command::new("open").arg(&dir).spawn().ok();
    #[cfg(target_os = "windows")]
    Command::new("explorer").arg(&dir).spawn().ok();
    #[cfg(target_os = "linux")]
    Command::new("xdg-open").arg(&dir).spawn().ok();
}
