mod fixtures;
mod nondet_tests;
mod topological_tests;
