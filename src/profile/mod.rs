mod extension;
mod home;

pub use extension::extension_id;
pub use home::{with_clean_home, write_profile_tree, ProfileSpec};
