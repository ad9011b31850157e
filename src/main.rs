use anyhow::{bail, Context, Result};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use colored::Colorize;
use content_chain::report::ContentStats;
use content_chain::{prompt, ContentGenerator, GeneratedContent, Settings, Style};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const RULE: usize = 80;

#[derive(Parser, Debug)]
#[command(name = "content-chain")]
#[command(about = "Generate a blog idea, blog post, and social post from one topic")]
#[command(version)]
#[command(after_help = "Examples:\n  \
    content-chain                                    # interactive\n  \
    content-chain --topic \"artificial intelligence\" --style formal\n  \
    content-chain -t \"healthy eating\" -s humorous\n\n\
    Styles: formal, informal, humorous, professional")]
struct Cli {
    /// Area of interest to generate content for
    #[arg(short, long)]
    topic: Option<String>,

    /// Writing style
    #[arg(short, long, default_value = "informal", value_parser = parse_style)]
    style: Style,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    anthropic_api_key: Option<String>,

    /// Use a local Ollama server
    #[arg(long, env = "USE_OLLAMA", value_parser = BoolishValueParser::new())]
    use_ollama: bool,

    #[arg(long, env = "OLLAMA_MODEL", default_value = content_chain::config::DEFAULT_OLLAMA_MODEL)]
    ollama_model: String,

    #[arg(long, env = "OLLAMA_ENDPOINT", default_value = content_chain::config::DEFAULT_OLLAMA_ENDPOINT)]
    ollama_endpoint: String,

    /// Use Anthropic instead of OpenAI
    #[arg(long, env = "USE_ANTHROPIC", value_parser = BoolishValueParser::new())]
    use_anthropic: bool,

    #[arg(long, env = "TEMPERATURE", default_value_t = 0.7)]
    temperature: f64,

    #[arg(long, env = "MAX_TOKENS", default_value_t = 1000)]
    max_tokens: u32,

    #[arg(long, env = "OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Save each run to a text file in the output directory
    #[arg(
        long,
        env = "SAVE_TO_FILE",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    save_to_file: bool,
}

impl Cli {
    fn settings(&self) -> content_chain::Result<Settings> {
        let mut builder = Settings::builder()
            .use_ollama(self.use_ollama)
            .use_anthropic(self.use_anthropic)
            .ollama_model(&self.ollama_model)
            .ollama_endpoint(&self.ollama_endpoint)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .output_dir(&self.output_dir)
            .save_to_file(self.save_to_file);
        if let Some(key) = &self.openai_api_key {
            builder = builder.openai_api_key(key);
        }
        if let Some(key) = &self.anthropic_api_key {
            builder = builder.anthropic_api_key(key);
        }
        builder.build()
    }
}

fn parse_style(s: &str) -> std::result::Result<Style, String> {
    s.parse::<Style>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("content_chain=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "✗ Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    print_header();

    let (topic, style) = match (&cli.topic, cli.interactive) {
        (Some(topic), false) => (topic.clone(), cli.style),
        _ => interactive_input()?,
    };

    let settings = cli.settings().context("configuration is incomplete")?;
    let generator = ContentGenerator::from_settings(&settings, style)?;

    println!(
        "{}",
        "⏳ Generating content... this may take a while.".cyan()
    );
    println!();

    let content = generator
        .generate(&topic)
        .await
        .context("content generation failed")?;
    print_result(&content);

    if let Some(path) = &content.saved_to {
        println!(
            "{}",
            format!("✓ Results saved to: {}", path.display()).green()
        );
    }

    Ok(())
}

fn print_header() {
    let rule = "=".repeat(RULE);
    println!("{}", rule.cyan().bold());
    println!("{}", "  LLM CHAIN CONTENT GENERATOR".cyan().bold());
    println!("{}", rule.cyan().bold());
    println!();
}

fn read_line(label: &str) -> Result<String> {
    print!("{}", label.green());
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim().to_string())
}

fn interactive_input() -> Result<(String, Style)> {
    println!("Welcome to interactive mode!");
    println!();
    println!("{}", "Enter an area of interest:".yellow());
    println!("Examples: 'artificial intelligence', 'healthy eating', 'travel'");

    let topic = read_line("➜ Topic: ")?;
    if topic.is_empty() {
        bail!("topic must not be empty");
    }

    println!();
    println!("{}", "Choose a writing style:".yellow());
    let names: Vec<String> = Style::ALL.iter().map(|s| s.to_string()).collect();
    for line in prompt::numbered_list(&names).lines() {
        println!("  {}", line);
    }

    let choice = read_line("➜ Your choice (1-4, default 2): ")?;
    let style = if choice.is_empty() {
        Style::default()
    } else {
        match choice.parse::<usize>().ok().and_then(Style::from_choice) {
            Some(style) => style,
            None => {
                println!(
                    "{}",
                    format!("⚠ Using default style: {}", Style::default()).yellow()
                );
                Style::default()
            }
        }
    };

    println!();
    Ok((topic, style))
}

fn section(title: &str, body: &str, color: colored::Color) {
    let rule = "━".repeat(RULE);
    println!("{}", rule.color(color).bold());
    println!("{}", title.color(color).bold());
    println!("{}", rule.color(color).bold());
    println!("{}", body.trim());
    println!();
}

fn print_result(content: &GeneratedContent) {
    println!();
    println!("{}", "✓ GENERATION COMPLETE!".green().bold());
    println!();

    section(
        "STEP 1: BLOG POST IDEA",
        &content.blog_idea,
        colored::Color::Yellow,
    );
    section(
        "STEP 2: BLOG POST (200-300 WORDS)",
        &content.blog_post,
        colored::Color::Magenta,
    );
    section(
        "STEP 3: SOCIAL MEDIA POST (up to 280 characters)",
        &content.social_post,
        colored::Color::Blue,
    );

    let stats = ContentStats::of(content);
    let rule = "━".repeat(RULE);
    println!("{}", rule.cyan());
    println!("{}", "STATISTICS:".cyan());
    println!(
        "{}",
        format!("  Blog post length: {} words", stats.blog_post_words).cyan()
    );
    println!(
        "{}",
        format!("  Social post length: {} characters", stats.social_post_chars).cyan()
    );
    println!("{}", rule.cyan());
    println!();
}
