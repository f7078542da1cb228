//! Replays the sample demo script against the `sample` module.

use hostbind::{BindingKind, HandleState, HostValue, Runtime};
use hostbind_modules::sample_registry;

fn runtime() -> Runtime {
    Runtime::new(sample_registry().unwrap())
}

fn float(value: HostValue) -> f64 {
    value.as_float().unwrap()
}

#[test]
fn test_add() {
    let mut rt = runtime();
    let result = rt.call("add", &[HostValue::Int(2), HostValue::Int(3)]).unwrap();
    assert_eq!(result, HostValue::Int(5));
}

#[test]
fn test_fibonacci() {
    let mut rt = runtime();
    assert_eq!(rt.call("fibonacci", &[HostValue::Int(10)]).unwrap(), HostValue::Int(55));
    assert_eq!(rt.call("fibonacci", &[HostValue::Int(20)]).unwrap(), HostValue::Int(6765));
}

#[test]
fn test_point_walkthrough() {
    let mut rt = runtime();

    let p = rt
        .construct("Point", &[HostValue::Float(3.0), HostValue::Float(4.0)])
        .unwrap();
    assert_eq!(rt.type_of(p).unwrap(), "Point");
    assert_eq!(rt.state(p), HandleState::Constructed);
    assert_eq!(float(rt.get_field(p, "x").unwrap()), 3.0);
    assert_eq!(float(rt.get_field(p, "y").unwrap()), 4.0);
    assert_eq!(float(rt.call_method(p, "distance_from_origin", &[]).unwrap()), 5.0);

    let ret = rt
        .call_method(p, "translate", &[HostValue::Float(1.0), HostValue::Float(2.0)])
        .unwrap();
    assert_eq!(ret, HostValue::None);
    assert_eq!(rt.state(p), HandleState::Mutated);
    assert_eq!(float(rt.get_field(p, "x").unwrap()), 4.0);
    assert_eq!(float(rt.get_field(p, "y").unwrap()), 6.0);

    let q = rt
        .call_method(p, "scaled", &[HostValue::Float(2.0)])
        .unwrap()
        .as_object()
        .unwrap();
    assert_ne!(q, p);
    assert_eq!(float(rt.get_field(q, "x").unwrap()), 8.0);
    assert_eq!(float(rt.get_field(q, "y").unwrap()), 12.0);
    // the original is untouched
    assert_eq!(float(rt.get_field(p, "x").unwrap()), 4.0);
    assert_eq!(float(rt.get_field(p, "y").unwrap()), 6.0);

    rt.set_field(p, "x", HostValue::Float(10.0)).unwrap();
    rt.set_field(p, "y", HostValue::Float(20.0)).unwrap();
    assert_eq!(float(rt.get_field(p, "x").unwrap()), 10.0);
    assert_eq!(float(rt.get_field(p, "y").unwrap()), 20.0);
    // independent ownership
    assert_eq!(float(rt.get_field(q, "x").unwrap()), 8.0);

    assert_eq!(rt.live_objects(), 2);
    assert!(rt.release(q).unwrap());
    assert!(rt.release(p).unwrap());
    assert_eq!(rt.live_objects(), 0);
}

#[test]
fn test_keyword_construction() {
    let mut rt = runtime();
    let p = rt
        .construct_with_keywords("Point", &[HostValue::Float(1.5)], &[("y", HostValue::Float(-2.0))])
        .unwrap();
    assert_eq!(float(rt.get_field(p, "x").unwrap()), 1.5);
    assert_eq!(float(rt.get_field(p, "y").unwrap()), -2.0);

    let p = rt
        .construct_with_keywords("Point", &[], &[("y", HostValue::Float(2.0)), ("x", HostValue::Float(1.0))])
        .unwrap();
    assert_eq!(float(rt.get_field(p, "x").unwrap()), 1.0);
}

#[test]
fn test_integer_coordinates_widen() {
    let mut rt = runtime();
    let p = rt.construct("Point", &[HostValue::Int(3), HostValue::Int(4)]).unwrap();
    assert_eq!(float(rt.call_method(p, "distance_from_origin", &[]).unwrap()), 5.0);
}

#[test]
fn test_copy_is_independent() {
    let mut rt = runtime();
    let p = rt.construct("Point", &[HostValue::Float(1.0), HostValue::Float(1.0)]).unwrap();
    let c = rt.copy(p).unwrap();
    assert_ne!(c, p);
    rt.call_method(c, "translate", &[HostValue::Float(1.0), HostValue::Float(0.0)])
        .unwrap();
    assert_eq!(float(rt.get_field(c, "x").unwrap()), 2.0);
    assert_eq!(float(rt.get_field(p, "x").unwrap()), 1.0);
}

#[test]
fn test_describe_lists_bindings() {
    let registry = sample_registry().unwrap();
    assert_eq!(
        registry.describe(),
        "module sample\n\
         \x20 add(a: int, b: int) -> int [function]\n\
         \x20 fibonacci(n: int) -> int [function]\n\
         \x20 Point(x: float, y: float) [constructor]\n\
         \x20 Point.x: float [get]\n\
         \x20 Point.x: float [set]\n\
         \x20 Point.y: float [get]\n\
         \x20 Point.y: float [set]\n\
         \x20 Point.distance_from_origin() -> float [read-only]\n\
         \x20 Point.translate(dx: float, dy: float) -> none [mutating]\n\
         \x20 Point.scaled(factor: float) -> Point [value-producing]\n"
    );

    let kinds: Vec<_> = registry.bindings().into_iter().map(|binding| binding.kind).collect();
    assert_eq!(kinds.iter().filter(|kind| **kind == BindingKind::Function).count(), 2);
}

#[test]
fn test_registry_is_shared_across_threads() {
    let registry = sample_registry().unwrap();
    std::thread::scope(|scope| {
        for n in 0..4i64 {
            let registry = registry.clone();
            scope.spawn(move || {
                let mut rt = Runtime::new(registry);
                let result = rt.call("add", &[HostValue::Int(n), HostValue::Int(1)]).unwrap();
                assert_eq!(result, HostValue::Int(n + 1));
            });
        }
    });
}
