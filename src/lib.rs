// Expomos os módulos como biblioteca para que os testes de integração em
// tests/ exercitem o núcleo puro (máquina de estados, precificação,
// substituição de variáveis) sem subir o servidor.

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
