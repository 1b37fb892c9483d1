use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use einvoice::core::*;
use einvoice::ubl;

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn party(name: &str, city: &str, postal: &str, country: &str) -> Party {
    PartyBuilder::new(
        name,
        AddressBuilder::new(city, postal, country)
            .line("Hauptstr. 1")
            .build()
            .unwrap(),
    )
    .vat_number(format!("{country}123456789"))
    .build()
}

fn build_invoice(lines: usize) -> Invoice {
    let mut builder = InvoiceBuilder::new("BENCH-001", test_date())
        .due_date(test_date())
        .rounding_matrix(RoundingMatrix::new().with_default(2))
        .seller(party("Benchmark BV", "Amsterdam", "1011 AB", "NL"))
        .buyer(party("Kunde AG", "München", "80331", "DE"))
        .add_allowance(
            AllowanceChargeBuilder::percentage(dec!(3))
                .reason("Volume discount")
                .vat(TaxCategory::StandardRate, dec!(21))
                .build()
                .unwrap(),
        );

    for i in 1..=lines {
        let rate = if i % 3 == 0 { dec!(9) } else { dec!(21) };
        builder = builder.add_line(
            InvoiceLineBuilder::new(format!("Item {i}"), dec!(2.5), "C62", dec!(9.99))
                .vat(TaxCategory::StandardRate, rate)
                .build()
                .unwrap(),
        );
    }

    builder.build()
}

fn bench_build_invoice(c: &mut Criterion) {
    c.bench_function("build_invoice_10_lines", |b| {
        b.iter(|| black_box(build_invoice(10)));
    });
}

fn bench_totals(c: &mut Criterion) {
    let invoice = build_invoice(1000);
    c.bench_function("totals_1000_lines", |b| {
        b.iter(|| black_box(black_box(&invoice).totals()));
    });
}

fn bench_ubl_serialize(c: &mut Criterion) {
    let invoice = build_invoice(10);
    c.bench_function("ubl_serialize", |b| {
        b.iter(|| black_box(ubl::to_ubl_xml(black_box(&invoice))));
    });
}

fn bench_ubl_parse(c: &mut Criterion) {
    let registry = PresetRegistry::new();
    let xml = ubl::to_ubl_xml(&build_invoice(10)).unwrap();
    c.bench_function("ubl_parse", |b| {
        b.iter(|| black_box(ubl::from_ubl_xml(black_box(&xml), &registry)));
    });
}

fn bench_validate(c: &mut Criterion) {
    let registry = PresetRegistry::new();
    let invoice = build_invoice(10);
    c.bench_function("validate_all_en16931", |b| {
        b.iter(|| black_box(validate_all(black_box(&invoice), &registry)));
    });
}

fn bench_ubl_serialize_1000_lines(c: &mut Criterion) {
    let invoice = build_invoice(1000);
    c.bench_function("ubl_serialize_1000_lines", |b| {
        b.iter(|| black_box(ubl::to_ubl_xml(black_box(&invoice))));
    });
}

fn bench_ubl_parse_1000_lines(c: &mut Criterion) {
    let registry = PresetRegistry::new();
    let xml = ubl::to_ubl_xml(&build_invoice(1000)).unwrap();
    c.bench_function("ubl_parse_1000_lines", |b| {
        b.iter(|| black_box(ubl::from_ubl_xml(black_box(&xml), &registry)));
    });
}

criterion_group!(
    benches,
    bench_build_invoice,
    bench_totals,
    bench_ubl_serialize,
    bench_ubl_parse,
    bench_validate,
    bench_ubl_serialize_1000_lines,
    bench_ubl_parse_1000_lines,
);
criterion_main!(benches);
