//! Command-line front end. Each command opens the screens it needs, drives
//! them with intents and prints the resulting state.

use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::time::Duration;
use tokio::sync::broadcast;

use crate::app::AppContainer;
use crate::domain::{CharacterFilters, CharacterId, Gender, LifeStatus, ThemeColor};
use crate::error::CatalogError;
use crate::presentation::render::{self, Style};
use crate::presentation::settings::PROJECT_LINK;
use crate::presentation::{
    CharactersIntent, FiltersEffect, FiltersIntent, FavouritesIntent, NavRootIntent, Screen,
    ScreenHandle, SettingsEffect, SettingsIntent, ViewModel,
};

const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(
    name = "rm-catalog",
    version,
    about = "Browse Rick and Morty characters with an offline cache"
)]
pub struct Cli {
    /// Serve everything from the local cache
    #[arg(long, global = true, env = "RMC_OFFLINE")]
    pub offline: bool,

    /// Palette used for colored output
    #[arg(long, global = true, value_enum, default_value_t = ThemeArg::Dark)]
    pub theme: ThemeArg,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

impl ThemeArg {
    fn is_dark(self) -> bool {
        self == ThemeArg::Dark
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List characters page by page
    List {
        /// Substring of the name
        #[arg(short, long)]
        name: Option<String>,
        /// alive, dead or unknown
        #[arg(short, long)]
        status: Option<LifeStatus>,
        #[arg(long)]
        species: Option<String>,
        /// Subtype, the API's `type` field
        #[arg(short = 't', long = "type")]
        subtype: Option<String>,
        /// female, male, genderless or unknown
        #[arg(short, long)]
        gender: Option<Gender>,
        /// How many pages to load
        #[arg(short, long, default_value = "1")]
        pages: u32,
    },
    /// Show one character
    Show { id: CharacterId },
    /// Manage favourite characters
    #[command(subcommand)]
    Favourites(FavouritesCommands),
    /// Show the character chosen as yours
    Profile,
    /// View or change settings
    #[command(subcommand)]
    Settings(SettingsCommands),
    /// Inspect or clear the local cache
    #[command(subcommand)]
    Cache(CacheCommands),
}

#[derive(Subcommand)]
pub enum FavouritesCommands {
    List,
    Add { id: CharacterId },
    Remove { id: CharacterId },
    Toggle { id: CharacterId },
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    Show,
    /// Choose your character; `none` clears it
    Character { id: String },
    /// Accent color for a theme: `#RRGGBB`, `none` or `random`
    Color {
        #[arg(value_name = "THEME")]
        target: ThemeArg,
        value: String,
    },
    /// Print the project link
    Link,
    /// Print a bug-report mail link for `email`
    Report { email: String },
}

#[derive(Subcommand)]
pub enum CacheCommands {
    Stats,
    /// Remove cached characters; favourites are kept unless `--all`
    Clear {
        #[arg(long)]
        all: bool,
    },
}

/// Wait until `done` holds for the screen's state.
async fn settle<VM: ViewModel>(
    handle: &ScreenHandle<VM>,
    done: impl Fn(&VM::State) -> bool,
) -> Result<VM::State, CatalogError> {
    let mut rx = handle.watch();
    let state = tokio::time::timeout(SETTLE_TIMEOUT, rx.wait_for(|s| done(s)))
        .await
        .map_err(|_| CatalogError::RactorError(format!("{} timed out", VM::NAME)))?
        .map_err(|_| CatalogError::RactorError(format!("{} closed", VM::NAME)))?
        .clone();
    Ok(state)
}

async fn next_effect<E: Clone>(rx: &mut broadcast::Receiver<E>) -> Result<E, CatalogError> {
    tokio::time::timeout(SETTLE_TIMEOUT, rx.recv())
        .await
        .map_err(|_| CatalogError::RactorError("no answer from screen".into()))?
        .map_err(|e| CatalogError::RactorError(e.to_string()))
}

pub async fn run(cli: Cli, app: &AppContainer) -> Result<(), CatalogError> {
    let style = Style::new(
        &app.settings.settings(),
        cli.theme.is_dark(),
        std::io::stdout().is_terminal(),
    );
    match cli.command {
        Commands::List {
            name,
            status,
            species,
            subtype,
            gender,
            pages,
        } => {
            let filters = CharacterFilters {
                name,
                status,
                species,
                subtype,
                gender,
            };
            list(app, filters, pages, &style).await
        }
        Commands::Show { id } => show(app, id, &style).await,
        Commands::Favourites(cmd) => favourites(app, cmd, &style).await,
        Commands::Profile => profile(app, &style).await,
        Commands::Settings(cmd) => settings(app, cmd).await,
        Commands::Cache(cmd) => cache(app, cmd).await,
    }
}

/// Run the field edits through the filter sheet and take what it applies.
async fn edit_filters(
    app: &AppContainer,
    wanted: CharacterFilters,
) -> Result<CharacterFilters, CatalogError> {
    let sheet = app.open_filters(CharacterFilters::default()).await?;
    let mut effects = sheet.effects();
    sheet.dispatch(FiltersIntent::NameChanged(wanted.name.unwrap_or_default()));
    sheet.dispatch(FiltersIntent::StatusChanged(wanted.status));
    sheet.dispatch(FiltersIntent::SpeciesChanged(wanted.species.unwrap_or_default()));
    sheet.dispatch(FiltersIntent::TypeChanged(wanted.subtype.unwrap_or_default()));
    sheet.dispatch(FiltersIntent::GenderChanged(wanted.gender));
    sheet.dispatch(FiltersIntent::ApplyFilters);
    let FiltersEffect::Apply(filters) = next_effect(&mut effects).await?;
    sheet.close().await;
    Ok(filters)
}

async fn list(
    app: &AppContainer,
    filters: CharacterFilters,
    pages: u32,
    style: &Style,
) -> Result<(), CatalogError> {
    let filters = edit_filters(app, filters).await?;
    let nav = app.open_nav_root().await?;
    let screen = app.open_characters(nav.sender(), filters).await?;
    screen.sync().await?;

    let mut state = screen.state();
    for _ in 1..pages.max(1) {
        if state.end_of_data || state.error.is_some() {
            break;
        }
        state = screen.dispatch_and_wait(CharactersIntent::LoadMore).await?;
    }

    if let Some(error) = &state.error {
        eprintln!("error: {error}");
        if state.can_retry {
            eprintln!("the API could not be reached; run the command again to retry");
        }
    }
    if state.data_is_empty {
        println!("No characters found.");
    }
    for c in &state.characters {
        println!(
            "{}",
            render::character_row(c, state.is_favourite(c.id), state.is_my_character(c.id), style)
        );
    }
    println!(
        "{} shown{}",
        state.characters.len(),
        if state.end_of_data { ", end of data" } else { "" }
    );
    screen.close().await;
    nav.close().await;
    Ok(())
}

async fn show(app: &AppContainer, id: CharacterId, style: &Style) -> Result<(), CatalogError> {
    let nav = app.open_nav_root().await?;
    nav.dispatch(NavRootIntent::NavigateToScreen(Screen::Character(id)));
    let screen = app.open_character(id, nav.sender()).await?;
    let state = settle(&screen, |s| !s.is_loading).await?;
    match &state.character {
        Some(c) => {
            println!("{}", render::character_detail(c, style));
            let favourite = app.favourites.favourites().await?.contains(&id);
            if favourite {
                println!("  ★ favourite");
            }
        }
        None => eprintln!("Character {id} could not be loaded; try again later."),
    }
    screen.close().await;
    nav.close().await;
    Ok(())
}

async fn favourites(
    app: &AppContainer,
    cmd: FavouritesCommands,
    style: &Style,
) -> Result<(), CatalogError> {
    let nav = app.open_nav_root().await?;
    nav.dispatch(NavRootIntent::NavigateToBottomBarScreen(Screen::Favourites));
    let screen = app.open_favourites(nav.sender()).await?;
    match cmd {
        FavouritesCommands::List => {
            let state = settle(&screen, |s| !s.is_loading).await?;
            if let Some(error) = &state.error {
                eprintln!("error: {error}");
            }
            if state.characters.is_empty() {
                println!("No favourites yet.");
            }
            let mine = app.settings.settings().your_character_id;
            for c in &state.characters {
                println!("{}", render::character_row(c, true, mine == Some(c.id), style));
            }
        }
        FavouritesCommands::Add { id } => add_favourite(app, id).await?,
        FavouritesCommands::Remove { id } => {
            screen.dispatch_and_wait(FavouritesIntent::RemoveFromFavourites(id)).await?;
            println!("Removed {id} from favourites.");
        }
        FavouritesCommands::Toggle { id } => {
            if app.favourites.favourites().await?.contains(&id) {
                screen.dispatch_and_wait(FavouritesIntent::RemoveFromFavourites(id)).await?;
                println!("Removed {id} from favourites.");
            } else {
                add_favourite(app, id).await?;
            }
        }
    }
    screen.close().await;
    nav.close().await;
    Ok(())
}

async fn add_favourite(app: &AppContainer, id: CharacterId) -> Result<(), CatalogError> {
    // Cache the row so the favourites list can show it offline.
    if app.fetch_character().fetch(id).await.is_none() {
        eprintln!("warning: character {id} is not cached yet");
    }
    app.favourites.add_to_favourites(id).await?;
    println!("Added {id} to favourites.");
    Ok(())
}

async fn profile(app: &AppContainer, style: &Style) -> Result<(), CatalogError> {
    let screen = app.open_profile().await?;
    let state = settle(&screen, |s| !s.is_loading).await?;
    match (&state.character, state.character_id()) {
        (Some(c), _) => println!("{}", render::character_detail(c, style)),
        (None, None) => eprintln!("No character chosen; use `settings character <id>`."),
        (None, Some(id)) => eprintln!("Character {id} could not be loaded; try again later."),
    }
    screen.close().await;
    Ok(())
}

async fn settings(app: &AppContainer, cmd: SettingsCommands) -> Result<(), CatalogError> {
    let screen = app.open_settings().await?;
    let mut effects = screen.effects();
    match cmd {
        SettingsCommands::Show => {}
        SettingsCommands::Character { id } => {
            let id = match id.trim() {
                "none" => None,
                raw => Some(raw.parse::<CharacterId>().map_err(|_| {
                    CatalogError::InvalidInput(format!("`{raw}` is not a character id"))
                })?),
            };
            screen.dispatch_and_wait(SettingsIntent::SetMyCharacter(id)).await?;
        }
        SettingsCommands::Color { target, value } => {
            let is_dark = target.is_dark();
            let intent = match value.trim() {
                "none" => SettingsIntent::SetThemeColor {
                    is_dark,
                    color: None,
                },
                "random" => SettingsIntent::SetRandomThemeColor { is_dark },
                raw => SettingsIntent::SetThemeColor {
                    is_dark,
                    color: Some(raw.parse::<ThemeColor>()?),
                },
            };
            screen.dispatch(SettingsIntent::OpenColorDialog { is_dark });
            screen.dispatch_and_wait(intent).await?;
        }
        SettingsCommands::Link => {
            screen.dispatch(SettingsIntent::OpenLink(PROJECT_LINK.to_string()));
            if let SettingsEffect::OpenLink(link) = next_effect(&mut effects).await? {
                println!("{link}");
            }
        }
        SettingsCommands::Report { email } => {
            screen.dispatch(SettingsIntent::SendEmail(email));
            if let SettingsEffect::SendEmail(uri) = next_effect(&mut effects).await? {
                println!("{uri}");
            }
        }
    }
    let state = screen.state();
    if let Some(error) = &state.error {
        eprintln!("error: {error}");
    }
    println!("{}", render::settings_summary(&state.settings));
    let tabs: Vec<String> = crate::presentation::bottom_bar_screens(&state.settings)
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("tabs:         {}", tabs.join(" | "));
    screen.close().await;
    Ok(())
}

async fn cache(app: &AppContainer, cmd: CacheCommands) -> Result<(), CatalogError> {
    match cmd {
        CacheCommands::Stats => {
            let cached = app.local.count().await?;
            let favourites = app.favourites.favourites().await?.len();
            println!("cached characters: {cached}");
            println!("favourites:        {favourites}");
            println!("database:          {}", app.config().database_url);
        }
        CacheCommands::Clear { all } => {
            let removed = if all {
                app.local.clear().await?
            } else {
                app.local.clear_except_favourites().await?
            };
            println!("Removed {removed} cached characters.");
        }
    }
    Ok(())
}
