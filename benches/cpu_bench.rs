// CPU Benchmarks
// Performance benchmarks for 65C816 instruction execution

use criterion::{criterion_group, criterion_main, Criterion};
use snes_rs::{Bus, Cpu};
use std::hint::black_box;

/// Benchmark CPU instruction execution
/// Tests common instruction patterns to measure dispatch and execution
/// performance. Code runs from the WRAM mirror so no cartridge is
/// needed.
fn bench_cpu_instructions(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_instructions");

    // Benchmark NOP instruction (simplest operation)
    group.bench_function("nop", |b| {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();

        // NOP = 0xEA (2 cycles each)
        for i in 0..0x1000u32 {
            bus.write8(0x000200 + i, 0xEA);
        }
        cpu.pc = 0x0200;

        b.iter(|| {
            if cpu.pc >= 0x1100 {
                cpu.pc = 0x0200;
            }
            cpu.step(black_box(&mut bus));
        });
    });

    // Benchmark LDA immediate (common load operation)
    group.bench_function("lda_immediate", |b| {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();

        // LDA #$42 (0xA9 0x42)
        for i in (0..0x1000u32).step_by(2) {
            bus.write8(0x000200 + i, 0xA9);
            bus.write8(0x000201 + i, 0x42);
        }
        cpu.pc = 0x0200;

        b.iter(|| {
            if cpu.pc >= 0x1100 {
                cpu.pc = 0x0200;
            }
            cpu.step(black_box(&mut bus));
        });
    });

    // Benchmark 16-bit ADC immediate (native-mode arithmetic)
    group.bench_function("adc_immediate_16bit", |b| {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();

        // ADC #$0101 (0x69 0x01 0x01) at 16-bit width
        for i in (0..0x0FFFu32).step_by(3) {
            bus.write8(0x000200 + i, 0x69);
            bus.write8(0x000201 + i, 0x01);
            bus.write8(0x000202 + i, 0x01);
        }
        cpu.e = false;
        cpu.p = 0;
        cpu.pc = 0x0200;

        b.iter(|| {
            if cpu.pc >= 0x1100 {
                cpu.pc = 0x0200;
            }
            cpu.step(black_box(&mut bus));
        });
    });

    // Benchmark direct-page read-modify-write
    group.bench_function("inc_direct_page", |b| {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();

        // INC $40 (0xE6 0x40)
        for i in (0..0x1000u32).step_by(2) {
            bus.write8(0x000200 + i, 0xE6);
            bus.write8(0x000201 + i, 0x40);
        }
        cpu.pc = 0x0200;

        b.iter(|| {
            if cpu.pc >= 0x1100 {
                cpu.pc = 0x0200;
            }
            cpu.step(black_box(&mut bus));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_cpu_instructions);
criterion_main!(benches);
