use covidstatsbot::api::{self, Client};
use covidstatsbot::chart::ChartRenderer;
use covidstatsbot::config::{Config, ConfigError};
use covidstatsbot::handlers::{self, PlotReply, PlotsReply};
use covidstatsbot::messages;
use covidstatsbot::users::{JsonFileStore, PersistenceError, SqliteStore, Users};
use teloxide::adaptors::throttle::Limits;
use teloxide::adaptors::Throttle;
use teloxide::macros::BotCommands;
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode, ReplyParameters};
use teloxide::utils::command::{BotCommands as _, ParseError};
use thiserror::Error;

type Bot = Throttle<teloxide::Bot>;

/// Country names may contain spaces, with or without quotes. A lone
/// apostrophe (`Côte d'Ivoire`) is no valid shell quoting, such arguments are
/// split on whitespace instead.
fn join_args(s: String) -> Result<(String,), ParseError> {
    let words = shlex::split(&s).unwrap_or_else(|| {
        s.split_whitespace().map(str::to_owned).collect()
    });
    Ok((words.join(" "),))
}

#[derive(BotCommands, Clone, Debug)]
#[command(
    rename_rule = "snake_case",
    description = "These commands are supported:"
)]
enum Command {
    #[command(description = "register and say hello.")]
    Start,
    #[command(description = "show this text.")]
    Help,
    #[command(description = "show global statistics.")]
    Stats,
    #[command(description = "show statistics for one country.", parse_with = join_args)]
    CountryStats { country: String },
    #[command(description = "list all available countries.")]
    Countries,
    #[command(description = "plot the figures of one country.", parse_with = join_args)]
    AvailablePlots { country: String },
}

#[derive(Error, Debug)]
enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot create api client: {0}")]
    Api(#[from] api::Error),
    #[error("cannot open user store: {0}")]
    Persistence(#[from] PersistenceError),
}

async fn answer(
    bot: Bot,
    msg: Message,
    cmd: Command,
    client: Client,
    users: Users,
) -> ResponseResult<()> {
    log::info!("{}: {:?}", msg.chat.id, cmd);
    let chat_id = msg.chat.id;

    let reply = match cmd {
        Command::Start => {
            users
                .record(chat_id.0, msg.chat.username(), msg.chat.first_name())
                .await;
            messages::welcome()
        }
        Command::Help => messages::help(),
        Command::Stats => handlers::stats(&client).await,
        Command::CountryStats { country } => handlers::country_stats(&client, &country).await,
        Command::Countries => handlers::countries(&client).await,
        Command::AvailablePlots { country } => {
            match handlers::available_plots(&client, &country).await {
                PlotsReply::Keyboard { text, keyboard } => {
                    bot.send_message(chat_id, text)
                        .parse_mode(ParseMode::MarkdownV2)
                        .reply_markup(keyboard)
                        .await?;
                    return Ok(());
                }
                PlotsReply::Text(text) => text,
            }
        }
    };

    bot.send_message(chat_id, reply)
        .parse_mode(ParseMode::MarkdownV2)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;
    Ok(())
}

async fn send_plot(
    bot: Bot,
    query: CallbackQuery,
    client: Client,
    renderer: ChartRenderer,
) -> ResponseResult<()> {
    bot.answer_callback_query(query.id.clone()).await?;

    let (Some(data), Some(message)) = (query.data.as_deref(), query.message.as_ref()) else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    log::info!("{chat_id} ({}): plot {data:?}", query.from.id);

    if let Err(e) = bot
        .edit_message_text(chat_id, message.id(), messages::plot_pending())
        .parse_mode(ParseMode::MarkdownV2)
        .await
    {
        log::warn!("Couldn't update keyboard message in {chat_id}: {e}");
    }

    match handlers::plot(&client, &renderer, data).await {
        PlotReply::Photo(png) => {
            bot.send_photo(chat_id, InputFile::memory(png).file_name("graph.png"))
                .await?;
        }
        PlotReply::Text(text) => {
            bot.send_message(chat_id, text)
                .parse_mode(ParseMode::MarkdownV2)
                .await?;
        }
    }
    Ok(())
}

async fn run() -> Result<(), StartupError> {
    let config = Config::from_env()?;
    let client = Client::new(config.api_url.clone(), config.http_timeout)?;

    let users = match &config.database_url {
        Some(url) => Users::new(SqliteStore::connect(url).await?),
        None => Users::new(JsonFileStore::new(&config.users_file)),
    };
    match users.count().await {
        Ok(n) => log::info!("{n} known users"),
        Err(e) => log::warn!("Couldn't read user store: {e}"),
    }

    let renderer = ChartRenderer::new(&config.chart_path);

    let bot = teloxide::Bot::from_env().throttle(Limits::default());
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        log::warn!("Couldn't register bot commands: {e}");
    }

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(answer),
        )
        .branch(Update::filter_callback_query().endpoint(send_plot));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![client, users, renderer])
        .default_handler(|_| async {})
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    log::info!("Starting bot...");

    if let Err(e) = run().await {
        log::error!("{e}");
        std::process::exit(1);
    }
}
