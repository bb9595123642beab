use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use propconnect::api::{ApiClient, ApiScope, PropertyApi};
use propconnect::config::ConsoleConfig;
use propconnect::editor::{Field, FieldEdit, ListingEditor, NewImage, PreviewRegistry};
use propconnect::filter::{FilterCriteria, ListingView, Selector, Visible};
use propconnect::models::Property;
use propconnect::session::AgentSession;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "propconnect", about = "Manage property listings from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List listings, optionally filtered
    List {
        /// Case-insensitive text to look for
        #[arg(short, long, default_value = "")]
        search: String,
        /// ACTIVE, INACTIVE, or ALL
        #[arg(long, default_value = "ALL")]
        status: String,
        /// RESIDENTIAL, COMMERCIAL, NEW_DEVELOPMENT, AGRICULTURE, or ALL
        #[arg(long = "type", default_value = "ALL")]
        property_type: String,
        /// List every listing through the admin endpoints
        #[arg(long)]
        all: bool,
    },
    /// Show one listing
    Show {
        id: i64,
        #[arg(long)]
        admin: bool,
    },
    /// Listing counters for the signed-in agent
    Stats,
    /// Inquiries received by the signed-in agent
    Inquiries,
    /// Show one inquiry
    Inquiry { id: i64 },
    /// Create a new listing
    Create(EditArgs),
    /// Edit an existing listing
    Edit {
        id: i64,
        #[arg(long)]
        admin: bool,
        #[command(flatten)]
        changes: EditArgs,
    },
    /// Delete a listing (admin)
    Delete { id: i64 },
}

#[derive(Args)]
struct EditArgs {
    /// Field assignment such as `price=5500000` or `city=Hyderabad`
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    sets: Vec<String>,
    /// Amenity to add
    #[arg(long = "amenity")]
    amenities: Vec<String>,
    /// Amenity to remove
    #[arg(long = "no-amenity")]
    removed_amenities: Vec<String>,
    /// Image file to upload
    #[arg(long = "add-image")]
    add_images: Vec<PathBuf>,
    /// Id of an existing image to delete
    #[arg(long = "remove-image")]
    remove_images: Vec<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ConsoleConfig::from_env()?;
    let client = ApiClient::new(&config)?;
    let session = sign_in(&client, &config).await?;

    match cli.command {
        Command::List {
            search,
            status,
            property_type,
            all,
        } => {
            let (scope, criteria) = if all {
                (ApiScope::Admin, FilterCriteria::admin())
            } else {
                (ApiScope::Agent(session.agent_id()), FilterCriteria::agent())
            };
            let criteria = criteria
                .with_text(search)
                .with_status(Selector::parse(&status))
                .with_type(Selector::parse(&property_type));

            let mut view = ListingView::new(criteria);
            view.refresh(&client, scope).await?;

            match view.visible() {
                Visible::Rows(rows) => {
                    for (i, property) in rows.iter().enumerate() {
                        print_summary(i + 1, property);
                    }
                    info!("{} listings shown", rows.len());
                }
                Visible::Empty => println!("No listings match these filters."),
                Visible::Loading => println!("Listings are still loading."),
                Visible::Failed(message) => bail!("Failed to load listings: {message}"),
            }
        }
        Command::Show { id, admin } => {
            let scope = scope_for(admin, &session);
            let property = client.get_property(id, scope).await?;
            println!("{}", serde_json::to_string_pretty(&property)?);
        }
        Command::Stats => {
            let stats = client.property_stats(session.agent_id()).await?;
            println!("Total:    {}", stats.total_properties);
            println!("Active:   {}", stats.active_properties);
            println!("Premium:  {}", stats.premium_properties);
            println!("Featured: {}", stats.featured_properties);
        }
        Command::Inquiries => {
            let inquiries = client.inquiries(session.agent_id()).await?;
            for inquiry in &inquiries {
                println!(
                    "#{} [{}] {} about \"{}\" ({})",
                    inquiry.id,
                    inquiry.status,
                    inquiry.user_name,
                    inquiry.property_title,
                    inquiry.inquiry_type
                );
            }
            info!("{} inquiries", inquiries.len());
        }
        Command::Inquiry { id } => {
            let inquiry = client.inquiry(id).await?;
            println!("{}", serde_json::to_string_pretty(&inquiry)?);
        }
        Command::Create(changes) => {
            let mut editor =
                ListingEditor::create(&session, PreviewRegistry::new()).with_policy(config.validation);
            apply_changes(&mut editor, changes).await?;
            let ack = editor.submit(&client).await?;
            println!("Created listing {} {}", ack.property_id, ack.message);
        }
        Command::Edit { id, admin, changes } => {
            let scope = scope_for(admin, &session);
            let mut editor = ListingEditor::open(&client, id, scope, PreviewRegistry::new())
                .await?
                .with_policy(config.validation);
            apply_changes(&mut editor, changes).await?;
            let ack = editor.submit(&client).await?;
            println!("Updated listing {} {}", ack.property_id, ack.message);
        }
        Command::Delete { id } => {
            let response = client.delete_property(id).await?;
            println!("Deleted listing {id} {}", response.message);
        }
    }

    Ok(())
}

async fn sign_in(client: &ApiClient, config: &ConsoleConfig) -> Result<AgentSession> {
    let (Some(username), Some(password)) = (&config.username, &config.password) else {
        bail!("Set PROPCONNECT_USERNAME and PROPCONNECT_PASSWORD to sign in");
    };
    let login = client
        .login(username, password)
        .await
        .context("Sign-in failed")?;
    Ok(AgentSession::from(login))
}

fn scope_for(admin: bool, session: &AgentSession) -> ApiScope {
    if admin {
        ApiScope::Admin
    } else {
        ApiScope::Agent(session.agent_id())
    }
}

async fn apply_changes(editor: &mut ListingEditor, changes: EditArgs) -> Result<()> {
    for assignment in &changes.sets {
        let (name, value) = assignment
            .split_once('=')
            .with_context(|| format!("Expected FIELD=VALUE, got {assignment:?}"))?;
        let field = Field::from_wire_name(name.trim())
            .with_context(|| format!("Unknown field {name:?}"))?;
        let Some(edit) = FieldEdit::parse(field, value) else {
            bail!("Field {field} cannot be edited");
        };
        editor.set_field(edit)?;
    }

    for amenity in &changes.amenities {
        editor.toggle_amenity(amenity, true)?;
    }
    for amenity in &changes.removed_amenities {
        editor.toggle_amenity(amenity, false)?;
    }

    for id in changes.remove_images {
        editor.remove_existing_image(id)?;
    }

    let mut files = Vec::with_capacity(changes.add_images.len());
    for path in &changes.add_images {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        files.push(NewImage::new(name, bytes));
    }
    editor.stage_images(files)?;

    Ok(())
}

fn print_summary(position: usize, property: &Property) {
    println!("{}. {} (₹{})", position, property.property_title, property.price);
    println!(
        "   {} · {} · {}, {}",
        property.property_type, property.status, property.locality, property.city
    );
    println!(
        "   {} bed, {} bath, {} images",
        property.bedrooms,
        property.bathrooms,
        property.property_images.len()
    );
    println!("   ID: {}", property.id);
    println!();
}
