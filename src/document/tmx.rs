//! Export of a document to Tiled's TMX (XML) map format.
//!
//! Tile data is written CSV-encoded. Index values map 1:1 onto TMX global
//! tile ids because the single tileset is emitted with `firstgid="1"`.

use std::fmt::{self, Write};

use super::{Document, TileLayer, Tileset};

const TMX_VERSION: &str = "1.10";

/// Escape a string for use inside a double-quoted XML attribute
fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Tiled color attribute: `#RRGGBB` when opaque, `#AARRGGBB` otherwise
fn color_attr(color: [u8; 4]) -> String {
    let [r, g, b, a] = color;
    if a == 255 {
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", a, r, g, b)
    }
}

fn write_tileset(out: &mut impl Write, tileset: &Tileset) -> fmt::Result {
    writeln!(
        out,
        r#" <tileset firstgid="1" name="{}" tilewidth="{}" tileheight="{}" tilecount="{}" columns="{}">"#,
        escape_attr(&tileset.name),
        tileset.tile_width,
        tileset.tile_height,
        tileset.tile_count,
        tileset.columns,
    )?;
    writeln!(
        out,
        r#"  <image source="{}" width="{}" height="{}"/>"#,
        escape_attr(&tileset.image.path.to_string_lossy()),
        tileset.image_width,
        tileset.image_height,
    )?;
    writeln!(out, " </tileset>")
}

fn write_layer(out: &mut impl Write, layer: &TileLayer, width: u32, height: u32) -> fmt::Result {
    write!(
        out,
        r#" <layer id="{}" name="{}" width="{}" height="{}""#,
        layer.id.0,
        escape_attr(&layer.name),
        width,
        height,
    )?;
    if layer.opacity < 1.0 {
        write!(out, r#" opacity="{}""#, layer.opacity)?;
    }
    if !layer.visible {
        write!(out, r#" visible="0""#)?;
    }
    if layer.offset.x != 0 {
        write!(out, r#" offsetx="{}""#, layer.offset.x)?;
    }
    if layer.offset.y != 0 {
        write!(out, r#" offsety="{}""#, layer.offset.y)?;
    }
    writeln!(out, ">")?;

    if let Some(image) = &layer.image {
        writeln!(out, "  <properties>")?;
        writeln!(
            out,
            r#"   <property name="image" type="file" value="{}"/>"#,
            escape_attr(&image.path.to_string_lossy()),
        )?;
        writeln!(out, "  </properties>")?;
    }

    writeln!(out, r#"  <data encoding="csv">"#)?;
    let row_width = width.max(1) as usize;
    let rows: Vec<String> = layer
        .tiles
        .as_slice()
        .chunks(row_width)
        .map(|row| {
            row.iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect();
    writeln!(out, "{}", rows.join(",\n"))?;
    writeln!(out, "  </data>")?;
    writeln!(out, " </layer>")
}

/// Write `doc` as a TMX document
pub fn write_tmx(doc: &Document, out: &mut impl Write) -> fmt::Result {
    let canvas = &doc.canvas;
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    write!(
        out,
        r#"<map version="{}" orientation="orthogonal" renderorder="right-down" width="{}" height="{}" tilewidth="{}" tileheight="{}" infinite="0""#,
        TMX_VERSION, canvas.width, canvas.height, canvas.tile_width, canvas.tile_height,
    )?;
    if canvas.background[3] != 0 {
        write!(out, r#" backgroundcolor="{}""#, color_attr(canvas.background))?;
    }
    writeln!(
        out,
        r#" nextlayerid="{}" nextobjectid="1">"#,
        doc.next_layer_id()
    )?;

    if let Some(tileset) = &doc.tileset {
        write_tileset(out, tileset)?;
    }
    for layer in &doc.layers {
        write_layer(out, layer, canvas.width, canvas.height)?;
    }
    writeln!(out, "</map>")
}
