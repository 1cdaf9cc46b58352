mod layout;
mod lte_backend;
mod mobility;
mod packet;
mod scenarios;
