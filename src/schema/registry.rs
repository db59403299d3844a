use std::sync::OnceLock;

use super::{SchemaBuilder, VersionSchema};

/// Every section name in `theme.ini` is this prefix followed by a version tag.
pub const SECTION_PREFIX: &str = "Termitheme";

/// A registered format revision.
#[derive(Debug)]
pub struct SchemaVersion {
    pub tag: &'static str,
    pub schema: VersionSchema,
}

impl SchemaVersion {
    pub fn section_name(&self) -> String {
        section_name(self.tag)
    }
}

const PALETTE: [&str; 16] = [
    "color0", "color1", "color2", "color3", "color4", "color5", "color6", "color7", "color8",
    "color9", "color10", "color11", "color12", "color13", "color14", "color15",
];

fn build_versions() -> Vec<SchemaVersion> {
    let v1 = SchemaBuilder::new()
        .add_color_low(PALETTE)
        .add_color_low(["fgcolor", "bgcolor", "fgbold"])
        .add_legacy_text(["name", "font", "cursor_shape"])
        .add_boolean(["allow_bold", "force_font", "use_fgbold"]);

    let v1_2 = v1
        .clone()
        .upgrade_color_depth()
        .add_color_high(["bgbold", "fgcursor", "bgcursor"])
        .add_text(["name", "font", "cursor_shape"])
        .add_archive_files([("credits", "credits.txt")]);

    // 1.1 files carried these; 1.0 readers never did, so the 1 section
    // accepts them on read but leaves them out on write.
    let v1 = v1.set_readonly(["fgbold", "use_fgbold"]);

    vec![
        SchemaVersion {
            tag: "1_2",
            schema: v1_2.build(),
        },
        SchemaVersion {
            tag: "1",
            schema: v1.build(),
        },
    ]
}

static VERSIONS: OnceLock<Vec<SchemaVersion>> = OnceLock::new();

/// All registered revisions, newest first.
pub fn versions() -> &'static [SchemaVersion] {
    VERSIONS.get_or_init(build_versions)
}

/// The newest registered revision.
pub fn newest() -> &'static SchemaVersion {
    &versions()[0]
}

pub fn version(tag: &str) -> Option<&'static SchemaVersion> {
    versions().iter().find(|version| version.tag == tag)
}

pub fn has_version(tag: &str) -> bool {
    version(tag).is_some()
}

pub fn section_name(tag: &str) -> String {
    format!("{SECTION_PREFIX}{tag}")
}
