use scheduler::args::{append_score, append_score_to, greet, mean_grade, pack};
use scheduler::error::Result;

/// 可变参数打包示例：位置参数、关键字参数以及累积容器的共享规则
fn main() -> Result<()> {
    // ---- 1. 位置参数 ----
    let persons = ["Naz", "Rabiah", "Jehan", "Sarah"];
    println!("Persons to greet: {:?}", persons);
    println!("{}", greet(&persons, None));

    println!("{}", "-".repeat(4));

    // ---- 2. 关键字参数 ----
    let grades = pack(Vec::<i64>::new(), [("Naz", 5), ("Rabiah", 5), ("Jehan", 2)])?;
    println!("Grades for the total: {:?}", grades.describe_keyword());
    println!("Mean Grade: {}", mean_grade(&grades)?);
    let grades = pack(Vec::<i64>::new(), [("Jules", 5), ("Brownie", 5), ("Zico", 2), ("Nyope", 1)])?;
    println!("Mean Grade: {}", mean_grade(&grades)?);

    // ---- 3. 每次调用使用新容器 ----
    println!("Scores: {:?}", append_score(98, None));
    println!("Scores: {:?}", append_score(94, None));
    println!("{}", "-".repeat(4));
    println!("Scores: {:?}", append_score(92, Some(vec![100, 95])));
    println!("Scores: {:?}", append_score(92, Some(vec![100, 95, 56])));

    // 只有显式传入同一个容器才会累积
    let mut shared = Vec::new();
    append_score_to(98, &mut shared);
    println!("Shared scores: {:?}", append_score_to(94, &mut shared));

    // ---- 4. 混合参数 ----
    let packed = pack(persons, [("Jules", 5), ("Brownie", 5), ("Zico", 2), ("Nyope", 1)])?;
    println!("{:?}", packed.describe_positional());
    println!("{:?}", packed.describe_keyword());
    let packed = pack(["Naz"], [("Jules", 5)])?;
    println!("{:?}", packed.describe_positional());
    println!("{:?}", packed.describe_keyword());

    // ---- 5. 拆出首元素 ----
    if let Some((first, rest)) = persons.split_first() {
        println!("{}", first);
        println!("rest={:?}", rest);
    }

    Ok(())
}
