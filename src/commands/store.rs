use std::path::Path;

use plantilla::config::Settings;
use plantilla::document::Translator;
use plantilla::template::{FileStore, Template, TemplateStore, prepare_save};

use crate::{LoadArgs, SaveArgs};

pub async fn save(args: &SaveArgs, config_file: Option<&Path>) -> Result<(), anyhow::Error> {
    let settings = Settings::load_from_arg(config_file).await?;
    let translator = Translator::from_config(&settings.editor);

    let json = tokio::fs::read_to_string(&args.file).await?;
    let template = Template::from_json(&json)?;

    let editor_html = match &args.editor_html {
        Some(path) => Some(tokio::fs::read_to_string(path).await?),
        None => None,
    };

    let payload = prepare_save(&template, editor_html.as_deref(), &translator)?;
    let store = FileStore::new(&settings.store.path);
    let id = store.save(&payload)?;

    println!(
        "Saved template {id} to {dir}",
        dir = store.dir().display()
    );

    Ok(())
}

pub async fn load(args: &LoadArgs, config_file: Option<&Path>) -> Result<(), anyhow::Error> {
    let settings = Settings::load_from_arg(config_file).await?;
    let store = FileStore::new(&settings.store.path);

    let template = store.load(&args.id)?;
    println!("{}", serde_json::to_string_pretty(&template)?);

    Ok(())
}
