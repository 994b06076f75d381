pub mod cnf;
