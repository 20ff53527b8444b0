use clap::Parser;
use ferrous_lookup_domain::{CliOverrides, Question, RecordType};
use tracing::{debug, info};

mod bootstrap;
mod di;

#[derive(Parser)]
#[command(name = "ferrous-lookup")]
#[command(version = "0.1.0")]
#[command(about = "Ferrous Lookup - iterative DNS resolver walking down from the root servers")]
struct Cli {
    /// Domain name to resolve
    #[arg(required_unless_present = "show_config")]
    name: Option<String>,

    /// Record type (A, AAAA, NS, CNAME, MX, TXT, ... or TYPE<n>)
    #[arg(default_value = "A")]
    record_type: RecordType,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Maximum number of CNAME hops to follow
    #[arg(long)]
    max_indirection: Option<i32>,

    /// Per-attempt receive timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Port nameservers are queried on
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Keep truncated UDP answers instead of retrying over TCP
    #[arg(long)]
    no_tcp_fallback: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    show_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.port,
        query_timeout_ms: cli.timeout_ms,
        max_indirection: cli.max_indirection,
        disable_tcp_fallback: cli.no_tcp_fallback,
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    if cli.show_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    bootstrap::init_logging(&config);

    let Some(name) = cli.name else {
        anyhow::bail!("a domain name is required");
    };
    let question = Question::new(&name, cli.record_type);
    info!(question = %question, "Starting lookup");

    let services = di::ResolverServices::new(&config).await?;
    let records = services
        .follow_cnames
        .execute(&question, config.resolver.max_indirection)
        .await?;

    debug!(
        records = records.len(),
        cached_questions = services.cache.len(),
        cache_hit_rate = services.cache.metrics().hit_rate(),
        "Lookup finished"
    );

    if records.is_empty() {
        println!(";; no records for {}", question);
        return Ok(());
    }

    let mut records: Vec<_> = records.into_iter().collect();
    records.sort_by(|a, b| {
        (a.name(), a.record_type().to_u16(), a.to_string())
            .cmp(&(b.name(), b.record_type().to_u16(), b.to_string()))
    });
    for record in records {
        println!("{}", record);
    }

    Ok(())
}
