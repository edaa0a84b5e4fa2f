//! Entrypoint discovery over a small project tree.

use crate::prelude::*;
use xm_common::{scan_python_entrypoints, ScanOptions};

#[test]
fn ranks_runnable_scripts_first() {
    let ws = Workspace::new();
    ws.file(
        "tools/run_sync.py",
        "#!/usr/bin/env python\nimport argparse\nif __name__ == \"__main__\":\n    main()\n",
    );
    ws.file("pkg/__main__.py", "from .cli import main\nmain()\n");
    ws.file("pkg/models.py", "class Model: ...\n");
    ws.file(".venv/lib/run_me.py", "if __name__ == '__main__': pass\n");
    ws.file("notes.txt", "not python\n");

    let discovery = scan_python_entrypoints(ws.path(), &ScanOptions::default()).unwrap();

    assert_eq!(discovery.total_files_scanned, 3);
    let ranked: Vec<_> = discovery
        .candidates
        .iter()
        .map(|c| (c.path.as_str(), c.score))
        .collect();
    assert_eq!(ranked, vec![("tools/run_sync.py", 3.0), ("pkg/__main__.py", 1.0)]);
    assert_eq!(discovery.candidates[0].sha256.len(), 64);
}
