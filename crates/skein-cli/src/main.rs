use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use skein_common::config::Config;
use skein_common::{Agent, ImageAttachment, PostBuilder, PostExt};
use url::Url;

#[derive(Parser)]
#[command(version, about = "skein - compose and publish Bluesky posts", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to config file [default: <config dir>/skein/config.kdl]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// PDS to talk to, overrides the config file
    #[arg(long, env = "SKEIN_PDS", global = true)]
    pds: Option<Url>,

    /// Handle, DID or email to log in with
    #[arg(long, env = "SKEIN_IDENTIFIER", global = true)]
    identifier: Option<String>,

    /// App password
    #[arg(long, env = "SKEIN_APP_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// More logging, repeat for trace output
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose a post and publish it
    Post(PostArgs),
    /// Print the DID a handle points to
    Resolve {
        /// Handle (e.g., alice.bsky.social)
        handle: String,
    },
}

#[derive(Args)]
struct PostArgs {
    /// Post text
    text: String,

    /// Link the first occurrence of ANCHOR to URI
    #[arg(long, num_args = 2, value_names = ["URI", "ANCHOR"])]
    link: Vec<String>,

    /// Mention an account at the first occurrence of ANCHOR
    #[arg(long, num_args = 2, value_names = ["DID_OR_HANDLE", "ANCHOR"])]
    mention: Vec<String>,

    /// Tag the first occurrence of ANCHOR
    #[arg(long, num_args = 2, value_names = ["TAG", "ANCHOR"])]
    tag: Vec<String>,

    /// Link card URL; a link card replaces any images
    #[arg(long, requires = "external_title")]
    external_uri: Option<Url>,

    /// Link card title
    #[arg(long, requires = "external_uri")]
    external_title: Option<String>,

    /// Link card description
    #[arg(long, requires = "external_uri")]
    external_description: Option<String>,

    /// Image to fetch, upload and attach, with its alt text
    #[arg(long, num_args = 2, value_names = ["URI", "ALT"])]
    image: Vec<String>,

    /// Post language (BCP-47), repeatable
    #[arg(long = "lang")]
    langs: Vec<String>,

    /// Print the record instead of publishing it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_miette();

    let cli = Cli::parse();
    skein_common::telemetry::init(cli.verbose);

    let config_path = cli.config.clone().or_else(Config::default_path);
    let config = match &config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    }
    .with_overrides(cli.pds.clone(), cli.identifier.clone());
    tracing::debug!(pds = %config.pds, "loaded config");

    match cli.command {
        Commands::Post(args) if args.dry_run => dry_run(args)?,
        Commands::Post(args) => publish(args, config, cli.password).await?,
        Commands::Resolve { handle } => {
            let agent = Agent::new(config.pds);
            println!("{}", agent.resolve_handle(&handle).await?);
        }
    }

    Ok(())
}

fn dry_run(args: PostArgs) -> Result<()> {
    if !args.image.is_empty() {
        return Err(miette::miette!(
            help = "drop --dry-run to upload them, or leave out --image",
            "images have to be uploaded before they can be embedded"
        ));
    }
    if let Some((value, _)) = pairs(&args.mention).find(|(value, _)| !value.starts_with("did:")) {
        return Err(miette::miette!(
            help = "pass a DID, or drop --dry-run so handles can be resolved",
            "cannot resolve handle {value} without network access"
        ));
    }

    let mentions = pairs(&args.mention)
        .map(|(did, anchor)| (did.to_owned(), anchor.to_owned()))
        .collect();
    let post = compose(&args, mentions)?.build()?;
    println!("{}", serde_json::to_string_pretty(&post).into_diagnostic()?);
    Ok(())
}

async fn publish(args: PostArgs, config: Config, password: Option<String>) -> Result<()> {
    let identifier = config.identifier.clone().ok_or_else(|| {
        miette::miette!(
            help = "pass --identifier, set SKEIN_IDENTIFIER, or add `identifier` to the config file",
            "no account to post as"
        )
    })?;
    let password = password.ok_or_else(|| {
        miette::miette!(
            help = "pass --password or set SKEIN_APP_PASSWORD",
            "no app password given"
        )
    })?;

    check_anchors(&args)?;

    let mut agent = Agent::new(config.pds);
    let session = agent.login(&identifier, &password).await?;
    println!("✓ Logged in as @{}", session.handle);

    let mut mentions = Vec::new();
    for (value, anchor) in pairs(&args.mention) {
        let did = if value.starts_with("did:") {
            value.to_owned()
        } else {
            agent.resolve_handle(value).await?
        };
        mentions.push((did, anchor.to_owned()));
    }

    let mut builder = compose(&args, mentions)?;

    let images = pairs(&args.image)
        .map(|(uri, alt)| {
            let source = Url::parse(uri).into_diagnostic()?;
            Ok(ImageAttachment::new(alt, source))
        })
        .collect::<Result<Vec<_>>>()?;
    if !images.is_empty() {
        println!("→ Uploading {} image(s)...", images.len());
        let blobs = agent.upload_images(&images).await?;
        builder = builder.with_images(images, blobs);
    }

    let published = agent.publish(builder).await?;
    println!("✓ Published {}", published.uri);
    println!("  cid {}", published.cid);
    Ok(())
}

/// Fail on a missing anchor before logging in or uploading anything.
/// Anchors are the same whether a mention holds a handle or its DID.
fn check_anchors(args: &PostArgs) -> Result<()> {
    let mentions = pairs(&args.mention)
        .map(|(value, anchor)| (value.to_owned(), anchor.to_owned()))
        .collect();
    compose(args, mentions)?.build()?;
    Ok(())
}

/// Everything but images, which need a logged-in agent.
fn compose(args: &PostArgs, mentions: Vec<(String, String)>) -> Result<PostBuilder> {
    let mut builder = PostBuilder::new(args.text.as_str()).with_langs(args.langs.iter().cloned());

    for (uri, anchor) in pairs(&args.link) {
        let uri = Url::parse(uri).into_diagnostic()?;
        builder = builder.with_link(&uri, anchor);
    }
    for (did, anchor) in mentions {
        builder = builder.with_mention(did, anchor);
    }
    for (tag, anchor) in pairs(&args.tag) {
        builder = builder.with_tag(tag, anchor);
    }
    if let (Some(uri), Some(title)) = (&args.external_uri, &args.external_title) {
        let description = args.external_description.clone().unwrap_or_default();
        builder = builder.with_external_link(title.as_str(), uri.clone(), description);
    }

    Ok(builder)
}

/// `--flag A B --flag C D` arrives flattened as `[A, B, C, D]`.
fn pairs(values: &[String]) -> impl Iterator<Item = (&str, &str)> {
    values
        .chunks_exact(2)
        .map(|pair| (pair[0].as_str(), pair[1].as_str()))
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
