//! `marquee`: browse the Reel Revival catalog and book a screening from the terminal.

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use marquee_booking::ticket::{
    DirectorySink, ExportFormat, LinkOpener, RenderedRegions, SharePlatform, TicketCard,
    TicketExporter, TicketSharer, format_rupees, ticket_text,
};
use marquee_booking::{
    BookingStore, Catalog, Category, Config, ConfirmedBooking, DetailsForm, MovieId,
    PaymentMethod, PrivateContentForm, ScreeningType, TheaterId, WizardAction, WizardEnvironment,
    WizardReducer, WizardState,
};
use marquee_core::environment::{Clock, SystemClock};
use marquee_runtime::{EffectHandle, Store};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "marquee", version)]
#[command(about = "Rent a Reel Revival theater for a regular or private screening")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List theaters with capacity, price and show times
    Theaters,

    /// List curated movies
    Movies(MoviesArgs),

    /// Book a theater and print the ticket
    Book(BookArgs),
}

#[derive(Args)]
struct MoviesArgs {
    /// all, hollywood, bollywood or tollywood
    #[arg(long, default_value = "all")]
    industry: Category,

    /// Case-insensitive match on title or genre
    #[arg(long)]
    search: Option<String>,
}

#[derive(Args)]
struct BookArgs {
    /// Theater id
    #[arg(long)]
    theater: TheaterId,

    /// Show time, e.g. "10:00 AM"
    #[arg(long)]
    time: String,

    /// Day within the booking window (defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Catalog movie id for a regular screening
    #[arg(long, conflicts_with = "content_type", required_unless_present = "content_type")]
    movie: Option<u32>,

    /// Content type id for a private screening, e.g. shortFilm
    #[arg(long)]
    content_type: Option<String>,

    /// Title of the private content
    #[arg(long, requires = "content_type")]
    content_title: Option<String>,

    /// Running time of the private content
    #[arg(long, requires = "content_type")]
    content_duration: Option<String>,

    /// Description of the private content
    #[arg(long, requires = "content_type")]
    content_description: Option<String>,

    /// Contact name
    #[arg(long)]
    name: String,

    /// Contact email
    #[arg(long)]
    email: String,

    /// Contact phone
    #[arg(long)]
    phone: String,

    /// Number of attendees
    #[arg(long, allow_negative_numbers = true)]
    attendees: i64,

    /// card, phonepe, paytm or gpay
    #[arg(long)]
    payment: PaymentMethod,

    /// Export the ticket, comma separated: pdf, image, word
    #[arg(long, value_delimiter = ',')]
    export: Vec<ExportFormat>,

    /// Share the booking: whatsapp, facebook, twitter or email
    #[arg(long)]
    share: Vec<String>,

    /// Print the booking as JSON instead of the text ticket
    #[arg(long)]
    json: bool,
}

impl BookArgs {
    fn actions(&self) -> Vec<WizardAction> {
        let mut actions = vec![WizardAction::Enter {
            theater_id: self.theater,
            suggested_movie: None,
        }];
        if let Some(date) = self.date {
            actions.push(WizardAction::SelectDate(date));
        }
        actions.push(WizardAction::SelectTime(self.time.clone()));

        match self.movie {
            Some(movie) => {
                actions.push(WizardAction::ChooseScreeningType(ScreeningType::Regular));
                actions.push(WizardAction::SelectMovie(MovieId::new(movie)));
            },
            None => {
                actions.push(WizardAction::ChooseScreeningType(ScreeningType::Private));
                actions.push(WizardAction::SubmitPrivateContent(PrivateContentForm {
                    content_type: self.content_type.clone().unwrap_or_default(),
                    content_title: self.content_title.clone().unwrap_or_default(),
                    content_duration: self.content_duration.clone().unwrap_or_default(),
                    content_description: self.content_description.clone().unwrap_or_default(),
                }));
            },
        }

        actions.push(WizardAction::SubmitDetails(DetailsForm {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            attendees: self.attendees,
        }));
        actions.push(WizardAction::SelectPayment(self.payment));
        actions
    }
}

/// Prints links instead of launching a browser
struct PrintLinks;

impl LinkOpener for PrintLinks {
    fn open(&self, url: &str) {
        println!("{url}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marquee=info,marquee_booking=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Invalid configuration")?;
    let catalog = Arc::new(Catalog::seeded());

    match cli.command {
        Commands::Theaters => list_theaters(&catalog),
        Commands::Movies(args) => list_movies(&catalog, &args),
        Commands::Book(args) => book(catalog, &config, &args).await?,
    }
    Ok(())
}

fn list_theaters(catalog: &Catalog) {
    for theater in catalog.theaters() {
        println!(
            "{:>2}  {:<24} {:>4} seats  {:>9}  {}",
            theater.id,
            theater.name,
            theater.capacity,
            format_rupees(theater.price),
            theater.available_times.join(", ")
        );
    }
}

fn list_movies(catalog: &Catalog, args: &MoviesArgs) {
    let movies = catalog.search(args.industry, args.search.as_deref().unwrap_or_default());
    if movies.is_empty() {
        println!("No movies found");
        return;
    }
    for movie in movies {
        println!(
            "{:>2}  {:<32} {}  {:<9}  {}",
            movie.id, movie.title, movie.year, movie.industry, movie.genre
        );
    }
}

async fn book(catalog: Arc<Catalog>, config: &Config, args: &BookArgs) -> Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let bookings = Arc::new(BookingStore::new(Arc::clone(&clock)));
    let env = WizardEnvironment::new(catalog, bookings, clock).with_config(config);
    let store = Store::new(WizardState::new(), WizardReducer::new(), env);

    let booking = run_wizard(&store, args.actions()).await;
    store.shutdown();
    let booking = booking?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&booking)?);
    } else {
        print!("{}", ticket_text(&booking));
    }

    if args.export.is_empty() && args.share.is_empty() {
        return Ok(());
    }

    let surface = Arc::new(
        RenderedRegions::new().with_region(&config.ticket_selector, TicketCard::render(&booking)),
    );

    if !args.export.is_empty() {
        let exporter = TicketExporter::new(
            surface.clone(),
            Arc::new(DirectorySink::new(&config.output_dir)),
            &config.ticket_prefix,
        );
        let exported = exporter
            .export_all(&args.export, &config.ticket_selector, Some(&booking.id))
            .await?;
        for ticket in exported {
            println!("Saved {} ticket to {}", ticket.format, ticket.location);
        }
    }

    let sharer = TicketSharer::new(
        surface,
        Arc::new(PrintLinks),
        &config.share_page_url,
        &config.ticket_selector,
    );
    for platform in &args.share {
        let platform: SharePlatform = platform.parse()?;
        sharer.share(&platform, &booking).await?;
    }
    Ok(())
}

/// Send every action, stopping at the first rejection, then wait for payment
async fn run_wizard(
    store: &Store<WizardReducer>,
    actions: Vec<WizardAction>,
) -> Result<ConfirmedBooking> {
    let mut last = EffectHandle::completed();
    for action in actions {
        let name = action.name();
        last = store.send(action).await?;
        if let Some(error) = store.state(|state| state.last_error.clone()).await {
            bail!("{name} rejected: {error}");
        }
    }

    tracing::info!("Processing payment");
    last.wait().await;

    store
        .state(|state| state.booking().cloned())
        .await
        .ok_or_else(|| anyhow!("Payment did not complete"))
}
