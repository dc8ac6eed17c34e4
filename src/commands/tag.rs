use plantilla::template::derive_variable_tag;

use crate::TagArgs;

pub fn run(args: &TagArgs) {
    for label in &args.labels {
        let tag = derive_variable_tag(label);
        if tag.is_empty() {
            tracing::warn!(label = %label, "label yields no variable tag");
            continue;
        }
        println!("{tag}");
    }
}
