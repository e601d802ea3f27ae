use anyhow::{Result, anyhow};
use clap::ValueEnum;

use super::LabelMap;
use crate::models::{Label, LabelObject};

/// How label conflicts are resolved when merging label maps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MergeMethod {
    /// Keep labels; conflicting objects from later maps get the first unused labels
    #[default]
    Keep,
    /// Objects sharing a label are joined into one object
    Aggregate,
    /// Relabel every object consecutively, in input order
    Pack,
    /// Any label conflict is an error
    Strict,
}

/// Merge several label maps sharing the same region into one.
/// The output uses the background of the first map.
pub fn merge(maps: Vec<LabelMap>, method: MergeMethod) -> Result<LabelMap> {
    let mut maps = maps.into_iter();
    let first = maps
        .next()
        .ok_or_else(|| anyhow!("Cannot merge an empty list of label maps"))?;
    let mut output = first.empty_like();
    let others: Vec<LabelMap> = maps.collect();

    for other in &others {
        if other.dimensions() != first.dimensions() {
            return Err(anyhow!(
                "Cannot merge label maps of different sizes: {}x{} and {}x{}",
                first.width(),
                first.height(),
                other.width(),
                other.height()
            ));
        }
    }

    let objects = std::iter::once(first)
        .chain(others)
        .flat_map(|map| map.into_objects());

    match method {
        MergeMethod::Keep => {
            let mut conflicting = Vec::new();
            for object in objects {
                if object.label == output.background || output.contains_label(object.label) {
                    conflicting.push(object);
                } else {
                    output.objects.insert(object.label, object);
                }
            }
            for object in conflicting {
                output.push(object)?;
            }
        }
        MergeMethod::Aggregate => {
            for object in objects {
                if object.label == output.background {
                    return Err(anyhow!(
                        "Object label {} is the background of the merged map",
                        object.label
                    ));
                }
                match output.get_mut(object.label) {
                    Some(existing) => absorb(existing, object),
                    None => {
                        output.objects.insert(object.label, object);
                    }
                }
            }
        }
        MergeMethod::Pack => {
            for object in objects {
                output.push(object)?;
            }
        }
        MergeMethod::Strict => {
            for object in objects {
                let label: Label = object.label;
                output
                    .insert(object)
                    .map_err(|e| anyhow!("Strict merge failed on label {}: {}", label, e))?;
            }
        }
    }

    Ok(output)
}

fn absorb(target: &mut LabelObject, source: LabelObject) {
    for run in source.runs() {
        target.add_run(*run);
    }
    target.optimize();
}
