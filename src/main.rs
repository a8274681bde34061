//! content-agent binary entry point

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use content_agent_rs::ai::content::{
    ArticleRequest, ContentGenerator, ContentType, ProjectRequest, SeoMetadata,
};
use content_agent_rs::ai::GeminiClient;
use content_agent_rs::config::{AppConfig, ConfigLoader, WordPressConfig};
use content_agent_rs::wordpress::{
    MediaAsset, PostDraft, PostStatus, PublishSession, TermKind, WordPressPublisher,
};
use content_agent_rs::{export, logging, media};

#[derive(Debug, Parser)]
#[command(name = "content-agent", version, about = "AI content generation with WordPress publishing")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print or write a sample configuration file
    InitConfig {
        /// Write to this path instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Test the WordPress connection and list cached terms
    Check,

    /// List categories or tags of the configured site
    Terms {
        /// categories | tags
        kind: TermKind,
    },

    /// Generate an article
    Article(ArticleArgs),

    /// Generate a multi-file project
    Project(ProjectArgs),

    /// Publish an existing markdown file
    Publish {
        /// Markdown file (front matter is honoured)
        file: PathBuf,

        /// Override the post title
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        publish: PublishArgs,
    },
}

#[derive(Debug, Args)]
struct ArticleArgs {
    /// Topic or title
    topic: String,

    /// Content type, e.g. "Blog Post", "tutorial", "api-documentation"
    #[arg(long = "type", short = 't', default_value = "Blog Post")]
    content_type: ContentType,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    requirements: Option<String>,

    #[arg(long)]
    style: Option<String>,

    #[arg(long)]
    audience: Option<String>,

    /// Target word count range, e.g. 800-1200
    #[arg(long)]
    word_count: Option<String>,

    /// Include a table of contents
    #[arg(long)]
    toc: bool,

    /// Skip the SEO metadata call
    #[arg(long)]
    no_seo: bool,

    /// Also write a standalone HTML page
    #[arg(long)]
    html: bool,

    /// Push the article to WordPress
    #[arg(long)]
    publish: bool,

    #[command(flatten)]
    publish_args: PublishArgs,
}

#[derive(Debug, Args)]
struct ProjectArgs {
    name: String,

    /// e.g. "Python CLI", "REST API", "React app"
    #[arg(long = "type", short = 't')]
    project_type: String,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    requirements: Option<String>,

    #[arg(long)]
    complexity: Option<String>,

    #[arg(long)]
    tests: bool,

    #[arg(long)]
    docker: bool,

    #[arg(long)]
    ci_cd: bool,

    #[arg(long)]
    audience: Option<String>,

    /// Skip the docstring / docs/ folder requirement
    #[arg(long)]
    no_docs: bool,

    /// Skip example usage files
    #[arg(long)]
    no_examples: bool,
}

#[derive(Debug, Args)]
struct PublishArgs {
    /// draft | publish (default from config)
    #[arg(long)]
    status: Option<PostStatus>,

    /// Category name, repeatable
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Tag name, repeatable
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Featured image file
    #[arg(long)]
    image: Option<PathBuf>,

    /// Fetch a placeholder featured image when no file is given
    #[arg(long)]
    placeholder_image: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::InitConfig { output } = &cli.command {
        return init_config(output.as_deref());
    }

    let config = ConfigLoader::new()
        .load_from_file(cli.config.as_deref().and_then(Path::to_str))
        .load_from_env()
        .build()?;

    let _guard = logging::init(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    match cli.command {
        Command::InitConfig { .. } => Ok(()),
        Command::Check => check(&config).await,
        Command::Terms { kind } => list_terms(&config, kind).await,
        Command::Article(args) => article(&config, args).await,
        Command::Project(args) => project(&config, args).await,
        Command::Publish {
            file,
            title,
            publish,
        } => publish_file(&config, &file, title, &publish).await,
    }
}

fn init_config(output: Option<&Path>) -> Result<()> {
    let sample = ConfigLoader::sample_config()?;
    match output {
        Some(path) => {
            std::fs::write(path, sample)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✅ サンプル設定を生成しました: {}", path.display());
        }
        None => print!("{}", sample),
    }
    Ok(())
}

fn wordpress_config(config: &AppConfig) -> Result<&WordPressConfig> {
    config
        .wordpress
        .as_ref()
        .context("WordPress is not configured (set [wordpress] or WORDPRESS_URL/USERNAME/PASSWORD)")
}

async fn connect(config: &AppConfig) -> Result<PublishSession> {
    let wp = wordpress_config(config)?;
    let mut session = PublishSession::new();
    let mode = session.configure_from(wp)?;
    info!(site = %wp.url, mode = ?mode, "WordPress configured");

    let report = session.test_connection().await?;
    println!("✅ {}", report.status.message);
    for warning in &report.warnings {
        println!("⚠️  {}", warning);
    }
    Ok(session)
}

async fn check(config: &AppConfig) -> Result<()> {
    let session = connect(config).await?;
    let publisher = session.publisher()?;

    println!("🔗 Site: {}", publisher.connection().site_url());
    println!("📡 Mode: {:?}", publisher.mode());
    println!("🧭 Permalinks: {:?}", publisher.permalink_mode());
    for kind in [TermKind::Categories, TermKind::Tags] {
        println!("🏷️  {}: {}", kind, session.terms().get(kind).len());
    }
    Ok(())
}

async fn list_terms(config: &AppConfig, kind: TermKind) -> Result<()> {
    let mut publisher = WordPressPublisher::from_config(wordpress_config(config)?)?;
    publisher.test_connection().await?;

    for term in publisher.fetch_terms(kind).await? {
        println!("{:>6}  {}", term.id, term.name);
    }
    Ok(())
}

fn generator(config: &AppConfig) -> Result<ContentGenerator> {
    Ok(ContentGenerator::new(GeminiClient::from_config(
        &config.generator,
    )?))
}

async fn article(config: &AppConfig, args: ArticleArgs) -> Result<()> {
    let mut request = ArticleRequest::new(&args.topic)
        .with_content_type(args.content_type)
        .with_toc(args.toc)
        .with_seo(!args.no_seo);
    if let Some(description) = args.description {
        request = request.with_description(description);
    }
    if let Some(requirements) = args.requirements {
        request = request.with_requirements(requirements);
    }
    if let Some(style) = args.style {
        request = request.with_style(style);
    }
    if let Some(audience) = args.audience {
        request = request.with_audience(audience);
    }
    if let Some(word_count) = args.word_count {
        request = request.with_word_count(word_count);
    }

    let content = generator(config)?.generate_article(&request).await?;
    println!("📝 Generated: {}", content.title);
    if let Some(seo) = &content.seo_metadata {
        print_seo(seo);
    }

    let saved = export::save_markdown_file(
        &config.output.markdown_dir,
        &content.markdown_body,
        &content.title,
        content.seo_metadata.as_ref(),
    )
    .await?;
    println!("💾 Markdown: {}", saved.display());

    if args.html {
        let page = export::save_html_page(
            &config.output.website_dir,
            &content.markdown_body,
            &content.title,
            content.seo_metadata.as_ref(),
        )
        .await?;
        println!("🌐 HTML: {}", page.display());
    }

    if args.publish {
        publish_content(
            config,
            &content.title,
            &content.markdown_body,
            &args.topic,
            &args.publish_args,
        )
        .await?;
    }
    Ok(())
}

fn print_seo(seo: &SeoMetadata) {
    println!("🔍 SEO title: {}", seo.title);
    println!("   description: {}", seo.description);
    println!("   keywords: {}", seo.keywords.join(", "));
    println!("   slug: {}", seo.slug);
}

async fn project(config: &AppConfig, args: ProjectArgs) -> Result<()> {
    let mut request = ProjectRequest::new(&args.name, &args.project_type)
        .with_tests(args.tests)
        .with_docker(args.docker)
        .with_ci_cd(args.ci_cd)
        .with_docs(!args.no_docs)
        .with_examples(!args.no_examples);
    if let Some(description) = args.description {
        request = request.with_description(description);
    }
    if let Some(requirements) = args.requirements {
        request = request.with_requirements(requirements);
    }
    if let Some(complexity) = args.complexity {
        request = request.with_complexity(complexity);
    }
    if let Some(audience) = args.audience {
        request = request.with_audience(audience);
    }

    let files = generator(config)?.generate_project(&request).await?;
    let root = config
        .output
        .projects_dir
        .join(export::project_dir_name(&args.name));
    let written = export::write_project_files(&root, &files).await?;

    println!("📁 {} files written to {}", written.len(), root.display());
    for name in files.keys() {
        println!("   {}", name);
    }
    Ok(())
}

async fn publish_file(
    config: &AppConfig,
    file: &Path,
    title: Option<String>,
    args: &PublishArgs,
) -> Result<()> {
    let document = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let (front_title, body) = export::split_front_matter(&document);

    let title = title
        .or(front_title)
        .unwrap_or_else(|| content_agent_rs::ai::content::extract_title(body));
    publish_content(config, &title, body, &title, args).await
}

async fn featured_image(
    config: &AppConfig,
    args: &PublishArgs,
    image_prompt: &str,
) -> Option<MediaAsset> {
    let loaded = if let Some(path) = &args.image {
        media::load_image(path).await
    } else if args.placeholder_image {
        let client = reqwest::Client::new();
        media::fetch_placeholder(&client, &config.generator.placeholder_image_url, image_prompt)
            .await
    } else {
        return None;
    };

    match loaded {
        Ok(asset) => Some(asset),
        Err(e) => {
            warn!(error = %e, "Featured image unavailable, publishing without it");
            println!("⚠️  Featured image unavailable: {}", e);
            None
        }
    }
}

async fn publish_content(
    config: &AppConfig,
    title: &str,
    body: &str,
    image_prompt: &str,
    args: &PublishArgs,
) -> Result<()> {
    let wp = wordpress_config(config)?;
    let status = match args.status {
        Some(status) => status,
        None => wp.default_status.parse()?,
    };

    let mut session = connect(config).await?;
    let media = featured_image(config, args, image_prompt).await;

    let draft = PostDraft::new(title, body)
        .with_status(status)
        .with_categories(args.categories.clone())
        .with_tags(args.tags.clone());

    let outcome = session.publish(draft, media).await;
    for warning in &outcome.warnings {
        println!("⚠️  {}", warning);
    }

    let result = outcome.result;
    if !result.success {
        bail!(
            "Publishing failed: {}",
            result.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }

    println!("🚀 Published ({})", status);
    if let Some(url) = &result.url {
        println!("   View: {}", url);
    }
    if let Some(edit_url) = &result.edit_url {
        println!("   Edit: {}", edit_url);
    }
    Ok(())
}
