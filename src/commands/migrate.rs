use plantilla::template::Template;

use crate::MigrateArgs;

pub async fn run(args: &MigrateArgs) -> Result<(), anyhow::Error> {
    let json = tokio::fs::read_to_string(&args.file).await?;
    let mut template = Template::from_json(&json)?;

    if template.document_content.is_none() && !template.paragraphs.is_empty() {
        template.document_content = Some(template.content_html());
    }

    println!("{}", serde_json::to_string_pretty(&template)?);

    Ok(())
}
