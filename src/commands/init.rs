use plantilla::config::{DEFAULT_CONFIG_FILE, Settings};

use crate::InitArgs;

pub async fn run(args: &InitArgs) -> Result<(), anyhow::Error> {
    let path = if args.path.is_relative() {
        std::env::current_dir()?.join(&args.path)
    } else {
        args.path.clone()
    };

    if !path.exists() {
        tokio::fs::create_dir_all(&path).await?;
        println!("Created directory {path}", path = path.display());
    }

    let config_path = path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config file already exists: {path} (use --force to overwrite)",
            path = config_path.display()
        ));
    }

    let config_text = serde_yaml::to_string(&Settings::default())?;
    tokio::fs::write(&config_path, config_text).await?;

    println!(
        "Created config file {config_file}",
        config_file = config_path.display()
    );

    Ok(())
}
