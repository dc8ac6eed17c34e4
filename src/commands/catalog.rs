use std::path::Path;

use plantilla::config::Settings;
use plantilla::template::{Form, VariableCatalog};

use crate::CatalogArgs;

pub async fn run(args: &CatalogArgs, config_file: Option<&Path>) -> Result<(), anyhow::Error> {
    let settings = Settings::load_from_arg(config_file).await?;

    let catalog = match &args.form {
        Some(path) => {
            let json = tokio::fs::read_to_string(path).await?;
            let form: Form = serde_json::from_str(&json)?;
            VariableCatalog::for_questions(&form.questions, &settings.catalog)
        }
        None => VariableCatalog::with_statics(&settings.catalog),
    };

    if args.yaml {
        print!("{}", serde_yaml::to_string(&catalog)?);
        return Ok(());
    }

    let width = catalog.iter().map(|v| v.tag.len()).max().unwrap_or(0);
    for variable in catalog.iter() {
        println!(
            "{tag:<width$}  {label}",
            tag = variable.tag,
            label = variable.label
        );
    }

    Ok(())
}
