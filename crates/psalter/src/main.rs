use clap::Parser;
use futures_util::future::join_all;
use psalter::service::{DEFAULT_BOOK, DEFAULT_ENDPOINT, DEFAULT_TRANSLATION};
use psalter::{Citation, HttpVerseService, VerseCache, VerseSpec};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "psalter", version, about, long_about = None)]
struct Cli {
    /// The chapter to look up (e.g. "91")
    chapter: String,

    /// Verse reference such as "1-3" or "v.10". The whole chapter is requested when omitted
    verses: Option<String>,

    /// Verse service endpoint
    #[arg(short = 'e', long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Book name sent to the service
    #[arg(short = 'b', long, default_value = DEFAULT_BOOK)]
    book: String,

    /// Translation sent to the service
    #[arg(short = 't', long, default_value = DEFAULT_TRANSLATION)]
    translation: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let service = HttpVerseService::new(&cli.endpoint, Duration::from_secs(cli.timeout))?;
    log::info!("Using verse service at {}", service.endpoint());
    let cache = VerseCache::new(service)
        .with_book(cli.book.as_str())
        .with_translation(cli.translation.as_str());

    let citation = Citation::new(cli.chapter, cli.verses.as_deref());
    let chapter = citation.chapter();
    println!("{}", citation.heading(cache.book()));

    let verses = match citation.spec() {
        VerseSpec::Missing => vec![cache.get(&chapter, None).await?],
        VerseSpec::Unparseable => {
            anyhow::bail!(
                "Unable to parse verse reference '{}'",
                citation.verses.unwrap_or_default()
            );
        }
        VerseSpec::Verses(numbers) => join_all(numbers.iter().map(|v| cache.get(&chapter, Some(v))))
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?,
    };

    let combined = verses
        .into_iter()
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    if combined.is_empty() {
        println!("No verse text returned by scripture service.");
    } else {
        println!("{}", combined);
    }

    Ok(())
}
