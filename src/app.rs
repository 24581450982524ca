use clap::{error::ErrorKind, CommandFactory, Parser};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::analytics::{self, DEFAULT_TOP_COMPANIES};
use crate::charts::{ChartBackend, ChartJs};
use crate::chat::DEFAULT_HISTORY_LIMIT;
use crate::cli::args::{AddArgs, CliArgs, Command, UploadArgs};
use crate::cli::validation;
use crate::client::{Backend, ClientOptions, HttpBackend};
use crate::config::{self, ConfigFile};
use crate::console::{print, ConsoleSurface};
use crate::controller::{Controller, Options};
use crate::forms::{AddCompanyForm, DocumentField};
use crate::markdown::CommonMark;
use crate::model::PolicyKind;
use crate::output::{self, OutputFormat};
use crate::view::Surface;

const DEFAULT_REPORT_PATH: &str = "termslens-report.html";

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

#[derive(Clone, Debug)]
struct RunConfig {
    api_url: String,
    timeout: Option<u64>,
    no_color: bool,
    assume_yes: bool,
    history_limit: usize,
    top_companies: usize,
    markdown: bool,
    output: Option<String>,
    output_format: Option<OutputFormat>,
    command: Command,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let api_url = args
        .api_url
        .or(cfg.api_url)
        .unwrap_or_else(|| ClientOptions::default().api_url);
    let timeout = args.timeout.or(cfg.timeout).filter(|t| *t > 0);

    let history_limit = cfg.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let top_companies = cfg.top_companies.unwrap_or(DEFAULT_TOP_COMPANIES);
    if top_companies == 0 {
        return Err("invalid top_companies, expected positive integer".to_string());
    }

    let output_format = match cfg.output_format.as_deref() {
        Some(raw) => Some(
            OutputFormat::parse(raw)
                .ok_or_else(|| format!("invalid output_format '{raw}' in config"))?,
        ),
        None => None,
    };

    Ok(RunConfig {
        api_url,
        timeout,
        no_color,
        assume_yes: args.yes,
        history_limit,
        top_companies,
        markdown: cfg.markdown.unwrap_or(true),
        output: cfg.output.map(|p| config::expand_tilde_string(&p)),
        output_format,
        command: args.command.unwrap_or(Command::List),
    })
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("termslens={level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn read_document(text: Option<String>, file: Option<String>) -> Result<Option<String>, String> {
    if let Some(text) = text {
        return Ok(Some(text));
    }
    match file {
        Some(path) => {
            let path = config::expand_tilde(&path);
            tokio::fs::read_to_string(&path)
                .await
                .map(Some)
                .map_err(|e| format!("failed to read '{}': {e}", path.display()))
        }
        None => Ok(None),
    }
}

async fn document_field(
    text: Option<String>,
    file: Option<String>,
    url: Option<String>,
) -> Result<Option<DocumentField>, String> {
    if let Some(url) = url {
        return Ok(Some(DocumentField::url(&url)));
    }
    Ok(read_document(text, file)
        .await?
        .map(|text| DocumentField::text(&text)))
}

async fn build_add_form(args: AddArgs) -> Result<AddCompanyForm, String> {
    let terms = if args.auto_fetch {
        DocumentField::auto_fetch()
    } else {
        document_field(args.terms_text, args.terms_file, args.terms_url)
            .await?
            .unwrap_or_default()
    };
    Ok(AddCompanyForm {
        name: args.name,
        category: args.category,
        terms,
        cookie: document_field(args.cookie_text, args.cookie_file, args.cookie_url).await?,
        privacy: document_field(args.privacy_text, args.privacy_file, args.privacy_url).await?,
    })
}

async fn build_upload_field(args: &UploadArgs) -> Result<DocumentField, String> {
    document_field(args.text.clone(), args.file.clone(), args.url.clone())
        .await?
        .ok_or_else(|| "provide exactly one of --text, --file or --url".to_string())
}

fn policy_arg(raw: &str) -> Result<PolicyKind, String> {
    PolicyKind::parse(raw).ok_or_else(|| format!("unknown policy '{raw}'"))
}

fn print_new_entries<B, S, C>(controller: &Controller<B, S, C>, from: usize)
where
    B: Backend,
    S: Surface,
    C: ChartBackend,
{
    for entry in controller.state().chat.entries().iter().skip(from) {
        print::print_chat_entry(entry);
    }
}

async fn chat_repl<B, S, C>(controller: &mut Controller<B, S, C>) -> Result<(), String>
where
    B: Backend,
    S: Surface,
    C: ChartBackend,
{
    println!("{}", crate::view::chat::WELCOME_MESSAGE);
    println!(
        "{}",
        "Commands: /company <id>, /all, /open <id>, /clear, /quit".dimmed()
    );
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines
            .next_line()
            .await
            .map_err(|e| format!("failed to read input: {e}"))?
        {
            Some(line) => line,
            None => return Ok(()),
        };
        let line = line.trim();
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        match cmd {
            "/quit" | "/exit" => return Ok(()),
            "/clear" => controller.clear_chat(),
            "/all" => controller.set_chat_filter(None),
            "/company" => controller.set_chat_filter(Some(rest.trim().to_string())),
            "/open" => {
                let id = rest.trim();
                if controller.open_source(id) {
                    if let Some(company) = controller.state().selected_company() {
                        print::print_company(company, PolicyKind::Terms, false);
                    }
                    controller.close_modal();
                } else {
                    println!("{}", format!("unknown company '{id}'").red());
                }
            }
            _ => {
                let before = controller.state().chat.entries().len();
                if controller.send_chat(line).await {
                    // The question itself was typed by the user; only show the reply.
                    print_new_entries(controller, before + 1);
                }
            }
        }
    }
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }

    let backend = HttpBackend::new(&ClientOptions {
        api_url: run.api_url.clone(),
        timeout_seconds: run.timeout,
    })
    .map_err(|e| e.to_string())?;
    info!(api_url = %backend.base_url(), "using backend");

    let mut controller = Controller::new(
        backend,
        ConsoleSurface::new(run.assume_yes),
        ChartJs::new(),
        Options {
            history_limit: run.history_limit,
            top_companies: run.top_companies,
        },
    );
    if run.markdown {
        controller = controller.with_markdown(Box::new(CommonMark::default()));
    }

    let loaded = controller.load_companies().await;
    if let Err(e) = &loaded {
        debug!(error = %e, "initial load failed");
    }

    match run.command {
        Command::List => {
            print::print_grid(&controller.state().store);
            loaded.map(|_| ()).map_err(|e| e.to_string())?;
        }
        Command::Show { id, tab, raw } => {
            let kind = policy_arg(&tab)?;
            if !controller.open_company(&id) {
                return Err(format!("company '{id}' not found"));
            }
            controller.switch_tab(kind);
            if raw {
                controller.toggle_raw_text(kind);
            }
            if let Some(company) = controller.state().selected_company() {
                print::print_company(company, kind, raw);
            }
        }
        Command::Add(args) => {
            let form = build_add_form(args).await?;
            let company = controller
                .add_company(&form)
                .await
                .map_err(|e| e.to_string())?;
            print::print_company(&company, PolicyKind::Terms, false);
        }
        Command::Delete { id } => {
            let deleted = controller
                .delete_company(&id)
                .await
                .map_err(|e| e.to_string())?;
            if deleted {
                format_kv_line("Deleted", &id);
            } else {
                println!("Cancelled.");
            }
        }
        Command::Analyze { id, policy } => {
            let kind = policy_arg(&policy)?;
            let company = controller
                .analyze(&id, kind)
                .await
                .map_err(|e| e.to_string())?;
            print::print_company(&company, kind, false);
        }
        Command::Upload(args) => {
            let kind = policy_arg(&args.policy)?;
            let field = build_upload_field(&args).await?;
            let company = controller
                .upload_document(&args.id, kind, &field)
                .await
                .map_err(|e| e.to_string())?;
            print::print_company(&company, kind, false);
        }
        Command::Seed { real } => {
            controller.seed(real).await.map_err(|e| e.to_string())?;
            print::print_grid(&controller.state().store);
        }
        Command::AnalyzeAll => {
            controller.analyze_all().await.map_err(|e| e.to_string())?;
            print::print_grid(&controller.state().store);
        }
        Command::Chat { company, question } => {
            if company.is_some() {
                controller.set_chat_filter(company);
            }
            match question {
                Some(question) => {
                    if !controller.send_chat(&question).await {
                        return Err("question is empty".to_string());
                    }
                    print_new_entries(&controller, 1);
                }
                None => chat_repl(&mut controller).await?,
            }
        }
        Command::Analytics => {
            loaded.map_err(|e| e.to_string())?;
            controller.open_dashboard();
            let analytics = analytics::aggregate(controller.state().store.companies());
            print::print_analytics(&analytics, run.top_companies);
            controller.close_dashboard();
        }
        Command::Report {
            output: report_path,
            format,
        } => {
            loaded.map_err(|e| e.to_string())?;
            let path = report_path
                .map(|p| config::expand_tilde_string(&p))
                .or(run.output)
                .unwrap_or_else(|| DEFAULT_REPORT_PATH.to_string());
            let format = format
                .as_deref()
                .and_then(OutputFormat::parse)
                .or(run.output_format)
                .or_else(|| output::infer_format_from_path(&path))
                .unwrap_or(OutputFormat::Html);

            controller.open_dashboard();
            let companies = controller.state().store.companies();
            let analytics = analytics::aggregate(companies);
            let bytes = match format {
                OutputFormat::Text => {
                    output::render_text(&output::build_records(companies), &analytics)
                }
                OutputFormat::Json => {
                    output::render_json(&output::build_records(companies), &analytics)
                }
                OutputFormat::Html => output::render_html(
                    companies,
                    &analytics,
                    &controller.charts().configs(),
                    controller.markdown(),
                ),
            };
            tokio::fs::write(&path, bytes)
                .await
                .map_err(|e| format!("failed to write report '{path}': {e}"))?;
            controller.close_dashboard();
            format_kv_line("Report", &path);
        }
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                print!("{}", CliArgs::command().render_long_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                print!("{}", CliArgs::command().render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    init_tracing(args.verbose);

    let explicit_config = args.config.is_some();
    let config_path = match args.config.as_deref() {
        Some(path) => Some(config::expand_tilde(path)),
        None => config::default_config_path(),
    };

    if args.init_config {
        let path = config_path.ok_or("could not determine a config location")?;
        config::ensure_default_config_file(&path)?;
        format_kv_line("Config", &path.display().to_string());
        return Ok(());
    }

    let cfg = match config_path.as_ref() {
        Some(path) => config::load_config(path, !explicit_config)?,
        None => ConfigFile::default(),
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))?;
    Ok(())
}
