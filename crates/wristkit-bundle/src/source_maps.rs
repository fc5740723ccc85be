//! Places source maps next to the component archives in the package.

use async_stream::try_stream;
use futures::StreamExt;
use wristkit_core::{BundleKind, ComponentType, FileRecord, SourceMapFile};
use wristkit_stream::{RecordStream, boxed};

/// Package path of a source map lifted out of a component archive
pub fn source_map_path(map: &SourceMapFile, kind: &BundleKind) -> String {
    match (map.component, kind) {
        (ComponentType::Device, BundleKind::Device { family, .. }) => {
            format!("sourceMaps/device/{family}/{}.map", map.file)
        }
        (component, _) => format!("sourceMaps/{component}/{}.map", map.file),
    }
}

/// Emit every source map carried by a bundle record right after it.
///
/// The bundle tag keeps its list so the package manifest can index them.
pub fn emit_source_maps(input: RecordStream) -> RecordStream {
    boxed(try_stream! {
        let mut input = input;
        while let Some(record) = input.next().await {
            let record = record?;
            let maps: Vec<FileRecord> = record
                .metadata
                .bundle
                .iter()
                .flat_map(|tag| {
                    tag.source_maps.iter().map(|map| {
                        FileRecord::buffer(source_map_path(map, &tag.kind), map.contents.clone())
                    })
                })
                .collect();

            yield record;
            for map in maps {
                tracing::debug!(path = %map.path(), "source map emitted");
                yield map;
            }
        }
    })
}
