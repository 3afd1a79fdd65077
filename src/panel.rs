//! The Tempest tool panel: an embedded page plus the dispatch glue
//! between page-side links and the host.

use crate::command::{Command, QueryParams, SchemeRequest};
use crate::error::TempestError;
use crate::host::{HtmlView, Session, ToolInstance};
use crate::models::{Model, StructureOption};
use crate::script;
use crate::tm_database::{CatalogResultsSource, ResultsSource};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use url::Url;

pub const TOOL_DISPLAY_NAME: &str = "Tempest";
pub const CUSTOM_SCHEME: &str = "templatematching";
/// Suggested initial tool size in logical units.
pub const SIZE_HINT: (u32, u32) = (575, 400);
/// Page resource co-located with the crate, loaded once at startup.
pub const PAGE_ASSET_PATH: &str = "assets/tempest.html";

pub struct TempestPanel<V: HtmlView> {
    session: Arc<dyn Session>,
    view: V,
    results: Box<dyn ResultsSource>,
    tool_name: String,
    display_name: String,
}

impl<V: HtmlView> TempestPanel<V> {
    /// Build the panel against the bundled page and results catalog.
    /// A missing page resource is fatal; the host gets the error and
    /// never shows the panel.
    pub fn new(
        session: Arc<dyn Session>,
        view: V,
        tool_name: &str,
    ) -> Result<Self, TempestError> {
        Self::with_parts(
            session,
            view,
            tool_name,
            Path::new(PAGE_ASSET_PATH),
            Box::new(CatalogResultsSource::default()),
        )
    }

    /// As [`Self::new`], with the page resource and results source
    /// supplied by the caller.
    pub fn with_parts(
        session: Arc<dyn Session>,
        view: V,
        tool_name: &str,
        page_path: &Path,
        results: Box<dyn ResultsSource>,
    ) -> Result<Self, TempestError> {
        let mut panel = Self {
            session,
            view,
            results,
            tool_name: tool_name.to_string(),
            display_name: TOOL_DISPLAY_NAME.to_string(),
        };
        let page = page_url(page_path)?;
        panel.view.set_url(page.as_str());
        Ok(panel)
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// Refresh the `<select>` options in the web form with the current
    /// list of atomic structures, and enable/disable the submit
    /// controls depending on whether any structure is open.
    pub fn update_models(&mut self) {
        let models = self.session.models();
        let options: Vec<StructureOption> = models
            .iter()
            .filter_map(|model| match model {
                Model::AtomicStructure(structure) => {
                    Some(StructureOption::for_structure(structure))
                }
                _ => None,
            })
            .collect();
        self.view
            .run_javascript(&script::model_update_script(&options));
    }

    fn load_database(&mut self, query: &QueryParams) -> Result<(), TempestError> {
        let database_id = query.require_first("database")?;
        let results = self.results.tm_results(database_id)?;
        let records_json = results.to_records_json()?;
        self.view
            .run_javascript(&script::load_database_script(&records_json));
        Ok(())
    }

    fn load_job_from_database(&self, query: &QueryParams) {
        info!(
            "received load_job_from_database event: {}",
            query.summary()
        );
        // TODO forward the selected job to the host command layer once
        // the host exposes one; until then this command only logs.
    }
}

impl<V: HtmlView> ToolInstance for TempestPanel<V> {
    const CUSTOM_SCHEME: &'static str = CUSTOM_SCHEME;
    const HELP: &'static str = "help:user/tools/tempest.html";

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn size_hint(&self) -> (u32, u32) {
        SIZE_HINT
    }

    // Called when the user follows a link with our scheme. The page
    // controls path and query through its own script, but the scheme is
    // an ordinary navigable URL surface, so the command is validated
    // here on every event rather than trusting the page.
    fn handle_scheme(&mut self, url: &Url) -> Result<(), TempestError> {
        let request = SchemeRequest::from_url(url, Self::CUSTOM_SCHEME)?;
        match request.command {
            Command::UpdateModels => {
                self.update_models();
                Ok(())
            }
            Command::LoadDatabase => self.load_database(&request.query),
            Command::LoadJobFromDatabase => {
                self.load_job_from_database(&request.query);
                Ok(())
            }
        }
    }

    fn models_changed(&mut self) {
        self.update_models();
    }
}

fn page_url(page_path: &Path) -> Result<Url, TempestError> {
    let absolute = fs::canonicalize(page_path).map_err(|e| {
        TempestError::Resource(format!(
            "Could not resolve panel page '{}': {e}",
            page_path.display()
        ))
    })?;
    Url::from_file_path(&absolute).map_err(|()| {
        TempestError::Resource(format!(
            "Panel page '{}' has no file URL",
            absolute.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AtomicStructure, Volume};
    use crate::tm_database::{TmResultRecord, TmResults};
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tracing_test::traced_test;

    struct StubSession {
        models: Vec<Model>,
    }

    impl Session for StubSession {
        fn models(&self) -> Vec<Model> {
            self.models.clone()
        }
    }

    #[derive(Clone, Default)]
    struct RecordingView {
        urls: Arc<Mutex<Vec<String>>>,
        scripts: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingView {
        fn scripts(&self) -> Vec<String> {
            self.scripts.lock().unwrap().clone()
        }
    }

    impl HtmlView for RecordingView {
        fn set_url(&mut self, url: &str) {
            self.urls.lock().unwrap().push(url.to_string());
        }

        fn run_javascript(&mut self, script: &str) {
            self.scripts.lock().unwrap().push(script.to_string());
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSource {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl ResultsSource for RecordingSource {
        fn tm_results(&self, database_id: &str) -> Result<TmResults, TempestError> {
            self.calls.lock().unwrap().push(database_id.to_string());
            Ok(TmResults::new(vec![TmResultRecord {
                job_id: 7,
                job_name: "run7".to_string(),
                template: "6B7N".to_string(),
                symmetry: None,
                pixel_size: None,
                peak_count: None,
                best_score: Some(11.25),
            }]))
        }
    }

    fn page_file() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tempest.html");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"<html></html>").unwrap();
        (dir, path)
    }

    fn panel_with(
        models: Vec<Model>,
    ) -> (
        tempfile::TempDir,
        TempestPanel<RecordingView>,
        RecordingView,
        RecordingSource,
    ) {
        let (dir, page) = page_file();
        let view = RecordingView::default();
        let source = RecordingSource::default();
        let panel = TempestPanel::with_parts(
            Arc::new(StubSession { models }),
            view.clone(),
            "Template matching",
            &page,
            Box::new(source.clone()),
        )
        .unwrap();
        (dir, panel, view, source)
    }

    fn two_structures() -> Vec<Model> {
        vec![
            Model::AtomicStructure(AtomicStructure::new(1, "model#1")),
            Model::Volume(Volume {
                id: 2,
                name: "density".to_string(),
            }),
            Model::AtomicStructure(AtomicStructure::new(3, "model#2")),
        ]
    }

    #[test]
    fn lifecycle_flags_match_the_host_contract() {
        assert!(!<TempestPanel<RecordingView> as ToolInstance>::SESSION_ENDURING);
        assert!(!<TempestPanel<RecordingView> as ToolInstance>::SESSION_SAVE);
        assert_eq!(
            <TempestPanel<RecordingView> as ToolInstance>::CUSTOM_SCHEME,
            "templatematching"
        );
    }

    #[test]
    fn init_loads_the_bundled_page_as_file_url() {
        let (_dir, panel, view, _source) = panel_with(vec![]);
        assert_eq!(panel.display_name(), "Tempest");
        assert_eq!(panel.tool_name(), "Template matching");
        assert_eq!(panel.size_hint(), (575, 400));
        let urls = view.urls.lock().unwrap().clone();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].starts_with("file://"));
        assert!(urls[0].ends_with("tempest.html"));
    }

    #[test]
    fn missing_page_resource_is_fatal() {
        let err = TempestPanel::with_parts(
            Arc::new(StubSession { models: vec![] }),
            RecordingView::default(),
            "Template matching",
            Path::new("/no/such/page.html"),
            Box::new(RecordingSource::default()),
        )
        .map(|_| ())
        .unwrap_err();
        assert!(err.to_string().contains("Could not resolve panel page"));
    }

    #[test]
    fn update_models_filters_to_atomic_structures_in_order() {
        let (_dir, mut panel, view, _source) = panel_with(two_structures());
        panel.update_models();
        let scripts = view.scripts();
        assert_eq!(scripts.len(), 1);
        assert!(scripts[0].contains(r##"<option value=\"#1\">model#1</option><option value=\"#3\">model#2</option>"##));
        assert!(scripts[0].contains("buttons[i].disabled = false;"));
    }

    #[test]
    fn update_models_with_no_structures_disables_submit() {
        let (_dir, mut panel, view, _source) = panel_with(vec![Model::Volume(Volume {
            id: 1,
            name: "density".to_string(),
        })]);
        panel.update_models();
        let scripts = view.scripts();
        assert!(scripts[0].contains("innerHTML = \"\";"));
        assert!(scripts[0].contains("buttons[i].disabled = true;"));
    }

    #[test]
    fn update_models_twice_is_byte_identical() {
        let (_dir, mut panel, view, _source) = panel_with(two_structures());
        panel.update_models();
        panel.update_models();
        let scripts = view.scripts();
        assert_eq!(scripts.len(), 2);
        assert_eq!(scripts[0], scripts[1]);
    }

    #[test]
    fn scheme_update_models_refreshes_options() {
        let (_dir, mut panel, view, _source) = panel_with(two_structures());
        let url = Url::parse("templatematching:update_models").unwrap();
        panel.handle_scheme(&url).unwrap();
        assert_eq!(view.scripts().len(), 1);
    }

    #[test]
    fn load_database_queries_the_source_and_injects_records() {
        let (_dir, mut panel, view, source) = panel_with(vec![]);
        let url = Url::parse("templatematching:load_database?database=abc123").unwrap();
        panel.handle_scheme(&url).unwrap();

        assert_eq!(source.calls.lock().unwrap().clone(), vec!["abc123"]);
        let scripts = view.scripts();
        assert_eq!(scripts.len(), 1);
        let expected_records =
            r#"[{"job_id":7,"job_name":"run7","template":"6B7N","best_score":11.25}]"#;
        assert_eq!(
            scripts[0],
            format!("tm_info={expected_records};\nload_database(tm_info);\n")
        );
    }

    #[test]
    fn load_database_without_database_parameter_fails_clearly() {
        let (_dir, mut panel, view, source) = panel_with(vec![]);
        let url = Url::parse("templatematching:load_database").unwrap();
        let err = panel.handle_scheme(&url).unwrap_err();
        assert_eq!(err.to_string(), "missing required parameter 'database'");
        assert!(source.calls.lock().unwrap().is_empty());
        assert!(view.scripts().is_empty());
    }

    #[test]
    fn failed_lookup_surfaces_as_user_error_and_leaves_page_alone() {
        struct FailingSource;
        impl ResultsSource for FailingSource {
            fn tm_results(&self, database_id: &str) -> Result<TmResults, TempestError> {
                Err(TempestError::Database(format!(
                    "unknown TM database '{database_id}'"
                )))
            }
        }
        let (_dir, page) = page_file();
        let view = RecordingView::default();
        let mut panel = TempestPanel::with_parts(
            Arc::new(StubSession { models: vec![] }),
            view.clone(),
            "Template matching",
            &page,
            Box::new(FailingSource),
        )
        .unwrap();
        let url = Url::parse("templatematching:load_database?database=gone").unwrap();
        let err = panel.handle_scheme(&url).unwrap_err();
        assert_eq!(err.to_string(), "unknown TM database 'gone'");
        assert!(view.scripts().is_empty());
    }

    #[traced_test]
    #[test]
    fn load_job_from_database_only_logs_the_parameters() {
        let (_dir, mut panel, view, source) = panel_with(two_structures());
        let url = Url::parse("templatematching:load_job_from_database?foo=1&bar=2").unwrap();
        panel.handle_scheme(&url).unwrap();

        assert!(view.scripts().is_empty());
        assert!(source.calls.lock().unwrap().is_empty());
        assert!(logs_contain("foo=1"));
        assert!(logs_contain("bar=2"));
        logs_assert(|lines: &[&str]| {
            match lines
                .iter()
                .filter(|line| line.contains("load_job_from_database event"))
                .count()
            {
                1 => Ok(()),
                n => Err(format!("expected exactly one event log line, got {n}")),
            }
        });
    }

    #[test]
    fn unknown_command_errors_and_panel_stays_usable() {
        let (_dir, mut panel, view, _source) = panel_with(two_structures());
        let url = Url::parse("templatematching:frobnicate").unwrap();
        let err = panel.handle_scheme(&url).unwrap_err();
        assert_eq!(err.to_string(), "unknown tm command: frobnicate");
        assert!(view.scripts().is_empty());

        // The failure is terminal for that event only.
        let url = Url::parse("templatematching:update_models").unwrap();
        panel.handle_scheme(&url).unwrap();
        assert_eq!(view.scripts().len(), 1);
    }

    #[test]
    fn models_changed_trigger_refreshes_options() {
        let (_dir, mut panel, view, _source) = panel_with(two_structures());
        panel.models_changed();
        assert_eq!(view.scripts().len(), 1);
    }
}
