use probot_bootstrap::{CreateOptions, Options, Probot, create_probot};
use std::env;
use std::process;

/// Returns the path given with `--config=<path>`, if any.
fn parse_config_path() -> Option<String> {
    env::args()
        .skip(1)
        .find_map(|arg| arg.strip_prefix("--config=").map(str::to_string))
}

fn redact(value: Option<&str>) -> &'static str {
    match value {
        Some(v) if !v.is_empty() => "<set>",
        _ => "<unset>",
    }
}

fn print_summary(probot: &Probot) {
    println!("version:       {}", probot.version());
    println!(
        "app_id:        {}",
        probot
            .app_id()
            .map(ToString::to_string)
            .unwrap_or_else(|| "<unset>".to_string())
    );
    println!("credentials:   {}", probot.credentials().kind());
    println!("private_key:   {}", redact(probot.private_key()));
    println!("secret:        {}", redact(Some(probot.secret())));
    println!("base_url:      {}", probot.base_url());
    println!("webhook_path:  {}", probot.webhook_path());
    println!("redis:         {}", redact(probot.redis_config()));
    println!("log_level:     {}", probot.log_level().unwrap_or("<unset>"));
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let defaults = match parse_config_path() {
        Some(path) => match Options::load(&path) {
            Ok(options) => options,
            Err(e) => {
                eprintln!("Failed to load options from {}: {}", path, e);
                process::exit(1);
            }
        },
        None => Options::default(),
    };

    let probot = match create_probot(CreateOptions::default().with_defaults(defaults)) {
        Ok(probot) => probot,
        Err(e) => {
            eprintln!("Failed to create app: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = probot.log().install_global() {
        eprintln!("Failed to install logger: {}", e);
    }

    if let Some(app_id) = probot.app_id().filter(|id| !id.is_number()) {
        probot.log().warn(&format!("APP_ID {:?} is not a number", app_id));
    }

    probot.log().info("configuration resolved");
    print_summary(&probot);
}
