pub const TEMPEST_DISPLAY_VERSION: &str = env!("TEMPEST_DISPLAY_VERSION");
pub const TEMPEST_BUILD_N: &str = env!("TEMPEST_BUILD_N");

pub fn version_cli_text() -> String {
    format!(
        "Tempest {}\nBuild {}\nTemplate-matching results panel",
        TEMPEST_DISPLAY_VERSION, TEMPEST_BUILD_N
    )
}
