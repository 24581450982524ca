use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "termslens",
    version,
    about = "privacy-risk browser for terms, cookie and privacy policies",
    long_about = "TermsLens browses companies and the AI-identified risks in their terms & conditions, cookie and privacy policies.\n\nExamples:\n  termslens list\n  termslens show 3 --tab privacy\n  termslens add --name Signal --category messaging --terms-url https://signal.org/legal\n  termslens chat \"Which apps sell my data?\"\n  termslens report -o report.html\n\nTip: Use --config to persist the backend URL and keep CLI invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "color",
        global = true,
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        long = "no-color",
        global = true,
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        global = true,
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.termslens/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a commented default config file and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'a',
        long = "api-url",
        value_name = "URL",
        global = true,
        help_heading = "Backend",
        help = "Base URL of the analysis backend."
    )]
    pub api_url: Option<String>,

    #[arg(
        long = "timeout",
        value_name = "SECONDS",
        global = true,
        help_heading = "Backend",
        help = "Request timeout in seconds (0 = none)."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'y',
        long = "yes",
        global = true,
        help_heading = "Actions",
        help = "Answer yes to confirmation prompts."
    )]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(about = "List companies as cards with their risk dots.")]
    List,

    #[command(about = "Show one company's details.")]
    Show {
        id: String,
        #[arg(long, value_name = "POLICY", default_value = "terms")]
        tab: String,
        #[arg(long, help = "Include the full policy text.")]
        raw: bool,
    },

    #[command(about = "Add a company and analyze its documents.")]
    Add(AddArgs),

    #[command(about = "Delete a company after confirmation.")]
    Delete { id: String },

    #[command(about = "Run the AI analysis for one policy.")]
    Analyze {
        id: String,
        #[arg(long, value_name = "POLICY", default_value = "terms")]
        policy: String,
    },

    #[command(about = "Upload a cookie or privacy policy for an existing company.")]
    Upload(UploadArgs),

    #[command(about = "Load sample companies into the backend.")]
    Seed {
        #[arg(long, help = "Fetch real policies instead of the bundled samples.")]
        real: bool,
    },

    #[command(about = "Analyze every company.")]
    AnalyzeAll,

    #[command(about = "Ask the assistant. Starts an interactive session without a question.")]
    Chat {
        #[arg(long, value_name = "ID", help = "Restrict answers to one company.")]
        company: Option<String>,
        question: Option<String>,
    },

    #[command(about = "Print risk analytics across all companies.")]
    Analytics,

    #[command(about = "Write a report of all companies and analytics.")]
    Report {
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output: Option<String>,
        #[arg(long = "format", value_name = "FORMAT", help = "text, json or html.")]
        format: Option<String>,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct AddArgs {
    #[arg(long, value_name = "NAME")]
    pub name: String,

    #[arg(long, value_name = "CATEGORY")]
    pub category: String,

    #[arg(long = "terms-text", value_name = "TEXT", help_heading = "Terms & Conditions")]
    pub terms_text: Option<String>,

    #[arg(long = "terms-file", value_name = "FILE", help_heading = "Terms & Conditions")]
    pub terms_file: Option<String>,

    #[arg(long = "terms-url", value_name = "URL", help_heading = "Terms & Conditions")]
    pub terms_url: Option<String>,

    #[arg(
        long = "auto-fetch",
        help_heading = "Terms & Conditions",
        help = "Let the backend find and fetch the terms."
    )]
    pub auto_fetch: bool,

    #[arg(long = "cookie-text", value_name = "TEXT", help_heading = "Cookie Policy")]
    pub cookie_text: Option<String>,

    #[arg(long = "cookie-file", value_name = "FILE", help_heading = "Cookie Policy")]
    pub cookie_file: Option<String>,

    #[arg(long = "cookie-url", value_name = "URL", help_heading = "Cookie Policy")]
    pub cookie_url: Option<String>,

    #[arg(long = "privacy-text", value_name = "TEXT", help_heading = "Privacy Policy")]
    pub privacy_text: Option<String>,

    #[arg(long = "privacy-file", value_name = "FILE", help_heading = "Privacy Policy")]
    pub privacy_file: Option<String>,

    #[arg(long = "privacy-url", value_name = "URL", help_heading = "Privacy Policy")]
    pub privacy_url: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct UploadArgs {
    pub id: String,

    #[arg(long, value_name = "POLICY", help = "cookie or privacy.")]
    pub policy: String,

    #[arg(long, value_name = "TEXT")]
    pub text: Option<String>,

    #[arg(long, value_name = "FILE")]
    pub file: Option<String>,

    #[arg(long, value_name = "URL")]
    pub url: Option<String>,
}
