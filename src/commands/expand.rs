use std::path::Path;

use plantilla::config::Settings;
use plantilla::document::{self, Translator};

use crate::ExpandArgs;

pub async fn run(args: &ExpandArgs, config_file: Option<&Path>) -> Result<(), anyhow::Error> {
    let settings = Settings::load_from_arg(config_file).await?;
    let translator = Translator::from_config(&settings.editor);

    let persisted = tokio::fs::read_to_string(&args.file).await?;
    let doc = translator.expand(&persisted);

    if args.editor_html {
        println!("{}", translator.to_editor_html(&doc));
        return Ok(());
    }

    println!("{doc:#?}");

    let conditions = document::conditions(&doc);
    let variables = document::variables(&doc);
    eprintln!(
        "{} conditional block(s), {} variable(s)",
        conditions.len(),
        variables.len()
    );
    for condition in conditions {
        eprintln!("  IF {condition}");
    }
    for variable in variables {
        eprintln!("  {{{{{variable}}}}}");
    }

    Ok(())
}
