use smicodec::{MibStore, OidRoot};

fn main() {
    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("usage: mibdump <mib-file>...");
        std::process::exit(2);
    }

    let mut store = MibStore::new();
    for path in &paths {
        let source = std::fs::read_to_string(path).expect("readable MIB file");
        match store.load(&source, path) {
            Ok(modules) => {
                for module in modules {
                    eprintln!("loaded {module}");
                }
            }
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(1);
            }
        }
    }
    if let Err(err) = store.link() {
        eprintln!("{err}");
        std::process::exit(1);
    }

    for module in store.modules() {
        println!("{}", module.name());
        for symbol in module.assignments() {
            if let Some(oid) = store.numeric_oid(symbol) {
                println!("  {:<32} {}", symbol.name(), render_oid(&oid));
            }
        }
    }
}

fn render_oid(oid: &[u32]) -> String {
    let mut out = String::new();
    for (i, arc) in oid.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        if i == 0 {
            if let Ok(root) = OidRoot::try_from(*arc) {
                out.push_str(root.name());
                continue;
            }
        }
        out.push_str(&arc.to_string());
    }
    out
}
