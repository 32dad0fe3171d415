//! XML utilities shared by the loaders and the markup detector.

mod utils;

pub use utils::{
    collect_text, element_children, find_by_path, find_child, get_tag_name,
    get_text, has_class, local_attribute, parse_document, replace_html_entities,
};
