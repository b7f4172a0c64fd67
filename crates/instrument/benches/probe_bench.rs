use criterion::{Criterion, black_box, criterion_group, criterion_main};
use html::parse_document;
use instrument::Recorder;
use instrument::probes::{compiled_selectors, probe_attributes, probe_elements};

const BLOCKS: usize = 5_000;

fn make_page(blocks: usize) -> String {
    let mut page = String::from("<!DOCTYPE html><html><body>");
    for i in 0..blocks {
        page.push_str(&format!(
            "<section data-i={i}><nav hidden><a ping=x href=#>n</a></nav>\
             <input type=email required onblur=f()><canvas></canvas></section>"
        ));
    }
    page.push_str("</body></html>");
    page
}

fn bench_attribute_probe(c: &mut Criterion) {
    let dom = parse_document(&make_page(BLOCKS));
    let selectors = compiled_selectors();
    c.bench_function("bench_attribute_probe", |b| {
        b.iter(|| {
            let recorder = Recorder::new();
            probe_attributes(black_box(&dom), selectors, &recorder);
            black_box(recorder.snapshot());
        });
    });
}

fn bench_element_probe(c: &mut Criterion) {
    let dom = parse_document(&make_page(BLOCKS));
    c.bench_function("bench_element_probe", |b| {
        b.iter(|| {
            let recorder = Recorder::new();
            probe_elements(black_box(&dom), &recorder);
            black_box(recorder.snapshot());
        });
    });
}

criterion_group!(benches, bench_attribute_probe, bench_element_probe);
criterion_main!(benches);
