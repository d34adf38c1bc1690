use crate::config::ResolveConfig;
use crate::error::ResolveError;
use crate::group::group_records;
use crate::merge::merge_groups;
use crate::model::{ResolveMeta, ResolveResult, ResolveSummary, Table};
use crate::quality::{analyze, FieldScore};
use crate::sanitize::{sanitize_dates, SanitizeReport};
use crate::select::{pinned_keys, select_keys};

/// Sanitized table plus its field scores. Output of the analysis stages.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub table: Table,
    pub sanitize: SanitizeReport,
    pub scores: Vec<FieldScore>,
}

/// Sanitize date columns and score every field.
pub fn analyze_table(config: &ResolveConfig, mut table: Table) -> Analysis {
    let date_fields = config.schema.all_date_fields();
    let sanitize = sanitize_dates(&mut table, &date_fields, &config.dates);
    if !sanitize.nulled.is_empty() {
        log::info!("nulled {} invalid or out-of-range date(s)", sanitize.nulled.len());
    }
    let scores = analyze(&table);
    Analysis {
        table,
        sanitize,
        scores,
    }
}

/// Key fields for an analysed table: pinned keys if configured, else the
/// threshold selection.
pub fn choose_keys(config: &ResolveConfig, analysis: &Analysis) -> Result<Vec<String>, ResolveError> {
    match config.keys.fields {
        Some(ref fields) => pinned_keys(fields, &analysis.table, &config.schema),
        None => select_keys(&analysis.scores, config.keys.threshold, &config.schema),
    }
}

/// Run the full pipeline: sanitize, score, select keys, group, merge.
///
/// Either the whole golden table is returned or an error; there is no
/// partial output.
pub fn run(config: &ResolveConfig, table: Table) -> Result<ResolveResult, ResolveError> {
    config.validate()?;

    let input_rows = table.len();
    let analysis = analyze_table(config, table);

    let key_fields = choose_keys(config, &analysis)?;
    log::info!("key fields: {}", key_fields.join(", "));

    let groups = group_records(&analysis.table, &key_fields)?;
    let merged_groups = groups.iter().filter(|g| g.members.len() > 1).count();
    log::info!(
        "{} record(s) in {} group(s), {} with duplicates",
        input_rows,
        groups.len(),
        merged_groups
    );

    let output = merge_groups(
        &analysis.table,
        &groups,
        &config.schema,
        &key_fields,
        &config.merge,
    )?;
    if output.dropped_groups > 0 {
        log::warn!("dropped {} group(s) with no dated record", output.dropped_groups);
    }

    let summary = ResolveSummary {
        input_rows,
        groups: groups.len(),
        merged_groups,
        golden_rows: output.golden.len(),
        dates_nulled: analysis.sanitize.nulled.len(),
        dropped_groups: output.dropped_groups,
    };

    Ok(ResolveResult {
        meta: ResolveMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            policy: config.merge.policy,
            threshold: config.keys.threshold,
        },
        summary,
        key_fields,
        scores: analysis.scores,
        golden: output.golden,
    })
}
