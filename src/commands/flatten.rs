use std::path::Path;

use plantilla::config::Settings;
use plantilla::document::Translator;

use crate::FlattenArgs;

pub async fn run(args: &FlattenArgs, config_file: Option<&Path>) -> Result<(), anyhow::Error> {
    let settings = Settings::load_from_arg(config_file).await?;
    let translator = Translator::from_config(&settings.editor);

    let editor_html = tokio::fs::read_to_string(&args.file).await?;
    println!("{}", translator.flatten_or_fallback(&editor_html));

    Ok(())
}
